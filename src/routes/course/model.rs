use axum::extract::Multipart;
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};
use crate::media::{ImageUpload, is_allowed_image};
use crate::validation::{Rule, Schema, as_number};

/// multipart 表单中的文件字段名
const IMAGE_FIELD: &str = "image";

#[derive(Debug, Default)]
pub struct CourseForm {
    pub fields: Map<String, Value>,
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourseDetails {
    pub title: String,
    pub description: String,
    pub price: f64,
}

pub fn course_schema() -> Schema {
    Schema::new()
        .field(
            "title",
            [Rule::Required, Rule::String, Rule::MinLen(1, "title must not be empty")],
        )
        .field(
            "description",
            [
                Rule::Required,
                Rule::String,
                Rule::MinLen(1, "description must not be empty"),
            ],
        )
        .field("price", [Rule::Required, Rule::Number, Rule::NonNegative])
}

impl CourseForm {
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = CourseForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == IMAGE_FIELD {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await?;
                // 空文件视为未上传
                if !bytes.is_empty() {
                    form.image = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            } else if !name.is_empty() {
                // 只含空白的字段按缺失处理
                let text = field.text().await?;
                form.fields
                    .insert(name, Value::String(text.trim().to_string()));
            }
        }

        Ok(form)
    }

    pub fn details(&self) -> AppResult<CourseDetails> {
        let fields = course_schema()
            .validate(&Value::Object(self.fields.clone()))
            .into_result()
            .map_err(AppError::Validation)?;

        let text = |key: &str| {
            fields
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Ok(CourseDetails {
            title: text("title"),
            description: text("description"),
            price: fields.get("price").and_then(as_number).unwrap_or_default(),
        })
    }

    /// 创建课程时必须带图片
    pub fn required_image(&mut self) -> AppResult<ImageUpload> {
        let image = self
            .image
            .take()
            .ok_or_else(|| AppError::validation("No file uploaded"))?;
        check_image(&image)?;
        Ok(image)
    }

    pub fn optional_image(&mut self) -> AppResult<Option<ImageUpload>> {
        match self.image.take() {
            Some(image) => {
                check_image(&image)?;
                Ok(Some(image))
            }
            None => Ok(None),
        }
    }
}

fn check_image(image: &ImageUpload) -> AppResult<()> {
    if is_allowed_image(&image.content_type) {
        Ok(())
    } else {
        Err(AppError::validation(
            "Invalid file format. Only PNG and JPG are allowed",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(fields: &[(&str, &str)], image: Option<&str>) -> CourseForm {
        CourseForm {
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect(),
            image: image.map(|content_type| ImageUpload {
                file_name: "cover".into(),
                content_type: content_type.into(),
                bytes: vec![0x89, 0x50, 0x4e, 0x47],
            }),
        }
    }

    #[test]
    fn parses_price_from_text() {
        let details = form(
            &[("title", "Rust"), ("description", "Intro"), ("price", "19.5")],
            None,
        )
        .details()
        .unwrap();
        assert_eq!(
            details,
            CourseDetails {
                title: "Rust".into(),
                description: "Intro".into(),
                price: 19.5,
            }
        );
    }

    #[test]
    fn lists_all_missing_fields() {
        let err = form(&[("price", "free")], None).details().unwrap_err();
        let AppError::Validation(messages) = err else {
            panic!("expected validation error");
        };
        assert_eq!(
            messages,
            vec![
                "title is required",
                "description is required",
                "price must be a number"
            ]
        );
    }

    #[test]
    fn image_rules() {
        assert!(form(&[], None).required_image().is_err());
        assert!(form(&[], Some("image/gif")).required_image().is_err());
        assert!(form(&[], Some("image/jpeg")).required_image().is_ok());
        assert!(form(&[], None).optional_image().unwrap().is_none());
        assert!(form(&[], Some("image/webp")).optional_image().is_err());
    }
}
