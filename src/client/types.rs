// File: ./src/client/types.rs
// Request payloads sent to the dispatch server, with the form checks the app
// runs before submitting them.
use bytes::Bytes;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub phone_number: String,
}

impl Registration {
    pub fn validate(&self) -> Result<(), String> {
        if self.username.is_empty() {
            return Err("Please enter a username".to_string());
        }
        if self.phone_number.len() != 10 || !self.phone_number.bytes().all(|b| b.is_ascii_digit())
        {
            return Err("Please enter a valid 10-digit phone number".to_string());
        }
        if self.password.chars().count() < 6 {
            return Err("Password must be at least 6 characters".to_string());
        }
        if self.password != self.confirm_password {
            return Err("Passwords do not match".to_string());
        }
        Ok(())
    }
}

/// Form fields of a new or edited delivery item.
#[derive(Debug, Clone, Default)]
pub struct ItemDraft {
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub customer_number: Option<String>,
    pub alternative_number: Option<String>,
    pub delivery_time: Option<String>,
    pub location: Option<String>,
    /// Newly picked photo. `None` keeps whatever the server already has.
    pub image: Option<ImageUpload>,
}

impl ItemDraft {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() || self.address.trim().is_empty() {
            return Err("Please fill name and address fields.".to_string());
        }
        Ok(())
    }

    /// Non-empty fields, trimmed, in form order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let optional = [
            ("description", &self.description),
            ("customer_number", &self.customer_number),
            ("alternative_number", &self.alternative_number),
            ("delivery_time", &self.delivery_time),
            ("location", &self.location),
        ];
        let mut out = vec![
            ("name", self.name.trim().to_string()),
            ("address", self.address.trim().to_string()),
        ];
        for (key, value) in optional {
            if let Some(v) = value {
                out.push((key, v.trim().to_string()));
            }
        }
        out
    }
}

/// A photo sent as a multipart file part: the item picture on create/update,
/// or the proof-of-delivery shot on `Delivered`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl ImageUpload {
    /// Proof-of-delivery photo, already compressed to JPEG by the host.
    pub fn jpeg(data: impl Into<Bytes>) -> Self {
        Self {
            file_name: "compressed_image.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            data: data.into(),
        }
    }

    /// Item picture named `item_image_<millis>.<ext>`, typed `image/<ext>`.
    pub fn item_photo(extension: &str, data: impl Into<Bytes>) -> Self {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        Self {
            file_name: format!(
                "item_image_{}.{}",
                chrono::Utc::now().timestamp_millis(),
                ext
            ),
            content_type: format!("image/{}", ext),
            data: data.into(),
        }
    }
}

/// Hand-built `multipart/form-data` body: text fields plus optional files.
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self {
            boundary: format!("courier-{}", Uuid::new_v4().simple()),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, image: &ImageUpload) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, image.file_name, image.content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(&image.data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn finish(mut self) -> (String, Bytes) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (self.content_type(), Bytes::from(self.body))
    }
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_checks() {
        let mut r = Registration {
            username: "ravi".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            phone_number: "9876543210".to_string(),
        };
        assert!(r.validate().is_ok());

        r.phone_number = "98765".to_string();
        assert!(r.validate().unwrap_err().contains("10-digit"));

        r.phone_number = "9876543210".to_string();
        r.confirm_password = "secret2".to_string();
        assert_eq!(r.validate().unwrap_err(), "Passwords do not match");
    }

    #[test]
    fn test_item_draft_fields() {
        let draft = ItemDraft {
            name: "  Parcel ".to_string(),
            address: "12 Lake Rd".to_string(),
            delivery_time: Some("Nov 21, 2025, 4:06 PM".to_string()),
            ..Default::default()
        };
        assert!(draft.validate().is_ok());
        let fields = draft.fields();
        assert_eq!(fields[0], ("name", "Parcel".to_string()));
        assert_eq!(fields.len(), 3);

        let empty = ItemDraft::default();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_item_photo_naming() {
        let img = ImageUpload::item_photo(".PNG", vec![0u8; 4]);
        assert!(img.file_name.starts_with("item_image_"));
        assert!(img.file_name.ends_with(".png"));
        assert_eq!(img.content_type, "image/png");
        assert_eq!(img.data.len(), 4);
    }

    #[test]
    fn test_multipart_layout() {
        let (ct, body) = MultipartForm::new()
            .text("status", "Delivered")
            .file("delivered_image", &ImageUpload::jpeg(vec![1u8, 2, 3]))
            .finish();
        let boundary = ct.strip_prefix("multipart/form-data; boundary=").unwrap();
        let text = String::from_utf8_lossy(&body);
        assert!(text.starts_with(&format!("--{}\r\n", boundary)));
        assert!(text.contains("name=\"status\"\r\n\r\nDelivered\r\n"));
        assert!(text.contains("filename=\"compressed_image.jpg\""));
        assert!(text.ends_with(&format!("--{}--\r\n", boundary)));
    }
}
