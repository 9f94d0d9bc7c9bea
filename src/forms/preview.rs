//! 图片选择与本地预览
//!
//! 预览是 base64 编码的 `data:` URL，只保存在表单状态中，不会随请求发送。

use super::ValidationError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use huraymila_shared::FileUpload;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePreview {
    data_url: String,
}

impl ImagePreview {
    /// 为图片文件生成预览；非 `image/*` 类型返回 `None`
    pub fn from_upload(file: &FileUpload) -> Option<Self> {
        if !file.is_image() {
            return None;
        }
        Some(Self {
            data_url: format!(
                "data:{};base64,{}",
                file.content_type,
                STANDARD.encode(&file.bytes)
            ),
        })
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }
}

/// 表单中的图片字段
///
/// `current` 是记录上已有的图片路径，`selected` 是本次新选的文件。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageField {
    pub current: Option<String>,
    selected: Option<FileUpload>,
    preview: Option<ImagePreview>,
}

impl ImageField {
    pub fn with_current(current: Option<String>) -> Self {
        Self {
            current,
            ..Self::default()
        }
    }

    /// 选择新图片；非图片文件被拒绝，已有选择保持不变
    pub fn select(&mut self, file: FileUpload) -> Result<(), ValidationError> {
        let preview = ImagePreview::from_upload(&file).ok_or(ValidationError::invalid("image"))?;
        self.preview = Some(preview);
        self.selected = Some(file);
        Ok(())
    }

    /// 撤销本次选择
    pub fn clear(&mut self) {
        self.selected = None;
        self.preview = None;
    }

    pub fn selected(&self) -> Option<&FileUpload> {
        self.selected.as_ref()
    }

    pub fn preview(&self) -> Option<&ImagePreview> {
        self.preview.as_ref()
    }

    /// 界面显示用：优先显示新选图片的预览，否则显示已有图片
    pub fn display_src(&self) -> Option<&str> {
        self.preview
            .as_ref()
            .map(ImagePreview::data_url)
            .or(self.current.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_is_data_url() {
        let file = FileUpload::new("dot.png", "image/png", vec![0x89, b'P', b'N', b'G']);
        let preview = ImagePreview::from_upload(&file).unwrap();
        assert_eq!(preview.data_url(), "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn test_non_image_rejected() {
        let pdf = FileUpload::new("a.pdf", "application/pdf", vec![1, 2, 3]);
        assert!(ImagePreview::from_upload(&pdf).is_none());

        let mut field = ImageField::with_current(Some("/uploads/news/old.jpg".into()));
        assert_eq!(field.select(pdf), Err(ValidationError::invalid("image")));
        assert!(field.selected().is_none());
        assert_eq!(field.display_src(), Some("/uploads/news/old.jpg"));
    }

    #[test]
    fn test_select_and_clear() {
        let mut field = ImageField::with_current(Some("/uploads/a.jpg".into()));
        field
            .select(FileUpload::new("b.gif", "image/gif", b"GIF89a".to_vec()))
            .unwrap();
        assert!(field.display_src().unwrap().starts_with("data:image/gif;base64,"));

        field.clear();
        assert!(field.preview().is_none());
        assert_eq!(field.display_src(), Some("/uploads/a.jpg"));
    }
}
