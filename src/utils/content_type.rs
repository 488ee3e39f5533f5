use mime::Mime;
use std::path::Path;

/// Content type of a served file, inferred from its extension.
pub fn content_type_for(path: &Path) -> Mime {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "bmp" => mime::IMAGE_BMP,
        "svg" => mime::IMAGE_SVG,
        "webp" => "image/webp".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        "tif" | "tiff" => "image/tiff".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for(Path::new("/tmp/a.png")), mime::IMAGE_PNG);
        assert_eq!(content_type_for(Path::new("/tmp/a.JPG")), mime::IMAGE_JPEG);
        assert_eq!(content_type_for(Path::new("/tmp/a.webp")).as_ref(), "image/webp");
        assert_eq!(
            content_type_for(Path::new("/tmp/noext")),
            mime::APPLICATION_OCTET_STREAM
        );
    }
}
