use serde::{Deserialize, Serialize};

use crate::modules::repo::Module;

#[derive(Debug, Deserialize)]
pub struct CreateModuleRequest {
    pub name: String,
    pub link_name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateModuleRequest {
    pub name: Option<String>,
    pub link_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ModuleResponse {
    pub id: i32,
    pub name: String,
    pub link_name: String,
    pub description: Option<String>,
}

impl From<Module> for ModuleResponse {
    fn from(module: Module) -> Self {
        Self {
            id: module.id,
            name: module.name,
            link_name: module.link_name,
            description: module.description,
        }
    }
}
