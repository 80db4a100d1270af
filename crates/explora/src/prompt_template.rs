use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tera::{Context, Error as TeraError, Tera};

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    tera.render("inline_template", &context)
}

pub fn load_prompt_file<T: Serialize>(
    template_file: impl Into<PathBuf>,
    context_data: &T,
) -> Result<String, TeraError> {
    let template_path = template_file.into();
    let template_content = fs::read_to_string(&template_path)
        .map_err(|e| TeraError::chain("Failed to read template file", e))?;
    load_prompt(&template_content, context_data)
}

/// A system/user template pair for one kind of request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplates {
    pub system: String,
    pub user: String,
}

impl PromptTemplates {
    pub fn new<S: Into<String>, U: Into<String>>(system: S, user: U) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    pub fn from_files(
        system: impl Into<PathBuf>,
        user: impl Into<PathBuf>,
    ) -> Result<Self, TeraError> {
        let read = |path: PathBuf| {
            fs::read_to_string(&path).map_err(|e| TeraError::chain("Failed to read template file", e))
        };
        Ok(Self {
            system: read(system.into())?,
            user: read(user.into())?,
        })
    }

    /// Render both templates against the same context, returning `(system, user)`.
    pub fn render<T: Serialize>(&self, context_data: &T) -> Result<(String, String), TeraError> {
        Ok((
            load_prompt(&self.system, context_data)?,
            load_prompt(&self.user, context_data)?,
        ))
    }
}
