//! Reading the image field out of a multipart request.

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;

use super::{StoredUpload, UploadError, UploadPolicy};

/// Form field carrying the image.
pub const IMAGE_FIELD: &str = "image";

/// Receive the single `image` file and store it under `policy`.
///
/// The extension is checked from the part's filename before its body is
/// read, and the body is abandoned as soon as it passes the size ceiling.
/// Parts under other names are skipped, as are `image` parts without a
/// filename (plain text fields, or the empty part browsers send when no
/// file was picked).
pub async fn read_image_field(
    multipart: &mut Multipart,
    policy: &UploadPolicy,
) -> Result<StoredUpload, UploadError> {
    let limit = policy.max_bytes();
    let mut received: Option<(String, Vec<u8>)> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| from_multipart_error(e, limit))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        if received.is_some() {
            return Err(UploadError::MultipleFiles);
        }

        policy.check_extension(&filename)?;

        let mut data = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| from_multipart_error(e, limit))?
        {
            policy.check_size((data.len() + chunk.len()) as u64)?;
            data.extend_from_slice(&chunk);
        }

        received = Some((filename, data));
    }

    let (filename, data) = received.ok_or(UploadError::NoFileProvided)?;
    policy.store(&filename, &data).await
}

/// Body-limit failures surface as 413 from axum; treat those as oversize.
fn from_multipart_error(err: MultipartError, limit: u64) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::PayloadTooLarge { limit }
    } else {
        UploadError::Malformed(err.body_text())
    }
}
