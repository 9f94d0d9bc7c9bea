//! 控制台表单状态管理
//!
//! 「新增 / 编辑」弹窗共用 `EditorModal` 状态机：
//!
//! ```text
//! Closed --open_add/open_edit--> Editing --begin_submit--> Submitting
//!                                   ^                          |
//!                                   +------ finish(Err) -------+
//! Closed <--------------------------------- finish(Ok) --------+
//! ```
//!
//! 具体表单只需实现 `FormModel`：持有输入、检查必填项、生成新建请求或差异补丁。

pub mod content;
pub mod initiative;
pub mod preview;

pub use content::{ContentForm, ContentRecord, NewsForm, SuccessStoryForm};
pub use initiative::InitiativeForm;
pub use preview::{ImageField, ImagePreview};

use crate::error::{ApiError, ApiResult};
use std::fmt;
use std::future::Future;
use tracing::debug;

// =========================================================
// 校验错误
// =========================================================

/// 本地校验失败；请求不会发出
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    /// 缺少的必填字段
    pub missing: Vec<&'static str>,
    /// 格式错误的字段
    pub invalid: Vec<&'static str>,
}

impl ValidationError {
    pub fn missing(fields: Vec<&'static str>) -> Self {
        Self {
            missing: fields,
            invalid: Vec::new(),
        }
    }

    pub fn invalid(field: &'static str) -> Self {
        Self {
            missing: Vec::new(),
            invalid: vec![field],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.invalid.is_empty()
    }

    /// 合并为 `Result`：没有任何问题时为 `Ok`
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.missing.is_empty() {
            write!(f, "Please fill in all required fields: {}", self.missing.join(", "))?;
        }
        if !self.invalid.is_empty() {
            if !self.missing.is_empty() {
                f.write_str("; ")?;
            }
            write!(f, "Invalid value for: {}", self.invalid.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::validation(e.to_string()).with_source(e)
    }
}

// =========================================================
// 表单模型
// =========================================================

/// 弹窗提交的内容
#[derive(Debug, Clone, PartialEq)]
pub enum FormSubmission<D, U> {
    Create(D),
    Update { id: String, update: U },
}

pub trait FormModel: Sized {
    /// 编辑时载入的后端记录
    type Record;
    /// 新建请求
    type Draft;
    /// 部分更新请求
    type Update;

    /// 新增模式下的默认值
    fn blank() -> Self;

    fn from_record(record: &Self::Record) -> Self;

    fn record_id(record: &Self::Record) -> &str;

    /// 生成新建请求；缺少必填项时返回错误
    fn to_draft(&self) -> Result<Self::Draft, ValidationError>;

    /// 生成只包含变化字段的更新请求
    fn to_update(&self, original: &Self::Record) -> Result<Self::Update, ValidationError>;
}

// =========================================================
// 弹窗状态机
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    Closed,
    Editing,
    Submitting,
}

pub struct EditorModal<F: FormModel> {
    phase: ModalPhase,
    form: F,
    original: Option<F::Record>,
    error: Option<String>,
}

impl<F: FormModel> Default for EditorModal<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FormModel> EditorModal<F> {
    pub fn new() -> Self {
        Self {
            phase: ModalPhase::Closed,
            form: F::blank(),
            original: None,
            error: None,
        }
    }

    pub fn phase(&self) -> ModalPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase != ModalPhase::Closed
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == ModalPhase::Submitting
    }

    /// 编辑已有记录（而非新增）
    pub fn is_edit(&self) -> bool {
        self.original.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    /// 可修改的表单；提交中或关闭时为 `None`
    pub fn form_mut(&mut self) -> Option<&mut F> {
        match self.phase {
            ModalPhase::Editing => Some(&mut self.form),
            _ => None,
        }
    }

    pub fn original(&self) -> Option<&F::Record> {
        self.original.as_ref()
    }

    pub fn open_add(&mut self) {
        self.form = F::blank();
        self.original = None;
        self.error = None;
        self.phase = ModalPhase::Editing;
    }

    pub fn open_edit(&mut self, record: F::Record) {
        self.form = F::from_record(&record);
        self.original = Some(record);
        self.error = None;
        self.phase = ModalPhase::Editing;
    }

    /// 关闭并重置；提交中不能关闭
    pub fn close(&mut self) -> bool {
        if self.phase == ModalPhase::Submitting {
            return false;
        }
        self.reset();
        true
    }

    fn reset(&mut self) {
        self.form = F::blank();
        self.original = None;
        self.error = None;
        self.phase = ModalPhase::Closed;
    }

    /// 校验并进入提交状态
    ///
    /// 校验失败时停留在 Editing 并记录错误；提交中再次调用会被拒绝。
    pub fn begin_submit(&mut self) -> ApiResult<FormSubmission<F::Draft, F::Update>> {
        match self.phase {
            ModalPhase::Closed => {
                return Err(ApiError::validation("The editor is not open"));
            }
            ModalPhase::Submitting => {
                return Err(ApiError::validation("A submission is already in progress"));
            }
            ModalPhase::Editing => {}
        }

        let built = match &self.original {
            None => self.form.to_draft().map(FormSubmission::Create),
            Some(record) => self
                .form
                .to_update(record)
                .map(|update| FormSubmission::Update {
                    id: F::record_id(record).to_string(),
                    update,
                }),
        };

        match built {
            Ok(submission) => {
                self.error = None;
                self.phase = ModalPhase::Submitting;
                Ok(submission)
            }
            Err(invalid) => {
                debug!(reason = %invalid, "form rejected locally");
                self.error = Some(invalid.to_string());
                Err(invalid.into())
            }
        }
    }

    /// 结束提交：成功则关闭，失败则回到 Editing 并显示错误消息
    pub fn finish<T>(&mut self, result: ApiResult<T>) -> ApiResult<T> {
        if self.phase != ModalPhase::Submitting {
            return result;
        }
        match &result {
            Ok(_) => self.reset(),
            Err(e) => {
                self.error = Some(e.message().to_string());
                self.phase = ModalPhase::Editing;
            }
        }
        result
    }

    /// `begin_submit` -> 执行请求 -> `finish`
    pub async fn submit_with<T, Op, Fut>(&mut self, op: Op) -> ApiResult<T>
    where
        Op: FnOnce(FormSubmission<F::Draft, F::Update>) -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let submission = self.begin_submit()?;
        let result = op(submission).await;
        self.finish(result)
    }
}

#[cfg(test)]
mod tests;
