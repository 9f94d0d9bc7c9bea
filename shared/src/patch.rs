//! 部分更新结构
//!
//! `Patch` 是「字段名 -> 已提供的值」的有序映射。未提供的可选字段根本不会进入映射，
//! 因此无论渲染为 multipart 还是 JSON，请求中都只包含调用方给出的字段。

use serde_json::{Map, Value};

/// 待上传的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// 按扩展名推断 MIME 类型，无法识别时为 `application/octet-stream`
    pub fn guess_content_type(file_name: &str) -> &'static str {
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "svg" => "image/svg+xml",
            "pdf" => "application/pdf",
            "doc" => "application/msword",
            "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "xls" => "application/vnd.ms-excel",
            "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            "txt" => "text/plain",
            _ => "application/octet-stream",
        }
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// 单个字段的值
#[derive(Debug, Clone, PartialEq)]
pub enum PatchValue {
    Text(String),
    /// 数字、布尔、数组等非字符串值
    Json(Value),
    File(FileUpload),
}

impl PatchValue {
    /// multipart 文本部分的表示；文件返回 `None`
    pub fn as_form_text(&self) -> Option<String> {
        match self {
            PatchValue::Text(s) => Some(s.clone()),
            PatchValue::Json(Value::String(s)) => Some(s.clone()),
            PatchValue::Json(v) => Some(v.to_string()),
            PatchValue::File(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    fields: Vec<(String, PatchValue)>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置字段；同名字段会被替换
    pub fn set(mut self, name: &str, value: PatchValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn text(self, name: &str, value: impl ToString) -> Self {
        self.set(name, PatchValue::Text(value.to_string()))
    }

    /// 仅当值存在时写入文本字段
    pub fn opt_text<T: ToString>(self, name: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.text(name, v),
            None => self,
        }
    }

    pub fn json(self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, PatchValue::Json(value.into()))
    }

    pub fn opt_json<T: Into<Value>>(self, name: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.json(name, v),
            None => self,
        }
    }

    /// 可清空的字段：`Some(None)` 写入空字符串，由后端解释为清除
    pub fn opt_clearable<T: Into<Value>>(self, name: &str, value: Option<Option<T>>) -> Self {
        match value {
            Some(Some(v)) => self.json(name, v),
            Some(None) => self.text(name, ""),
            None => self,
        }
    }

    pub fn file(self, name: &str, file: FileUpload) -> Self {
        self.set(name, PatchValue::File(file))
    }

    pub fn opt_file(self, name: &str, file: Option<FileUpload>) -> Self {
        match file {
            Some(f) => self.file(name, f),
            None => self,
        }
    }

    /// 追加多个同名文件（如附件列表），不替换已有字段
    pub fn files(mut self, name: &str, files: impl IntoIterator<Item = FileUpload>) -> Self {
        for f in files {
            self.fields.push((name.to_string(), PatchValue::File(f)));
        }
        self
    }

    fn insert(&mut self, name: &str, value: PatchValue) {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PatchValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PatchValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn has_files(&self) -> bool {
        self.fields
            .iter()
            .any(|(_, v)| matches!(v, PatchValue::File(_)))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 渲染为 JSON 对象
    ///
    /// 文件字段无法以 JSON 传输，会被跳过；携带文件的接口应使用 multipart。
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (name, value) in &self.fields {
            match value {
                PatchValue::Text(s) => {
                    map.insert(name.clone(), Value::String(s.clone()));
                }
                PatchValue::Json(v) => {
                    map.insert(name.clone(), v.clone());
                }
                PatchValue::File(_) => {}
            }
        }
        Value::Object(map)
    }

    pub fn into_fields(self) -> Vec<(String, PatchValue)> {
        self.fields
    }
}

/// 可转换为 `Patch` 的请求结构
pub trait IntoPatch {
    fn into_patch(self) -> Patch;
}

impl IntoPatch for Patch {
    fn into_patch(self) -> Patch {
        self
    }
}
