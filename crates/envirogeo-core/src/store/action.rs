//! Action-based store protocol
//!
//! Browser clients talk to the store through one endpoint with a body of
//! `{action, collection, data?, filter?, userId?}` and get back
//! `{success, data, error?}`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{Error, Result};

use super::{Document, DocumentStore, Filter};

/// Store operations reachable through the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreAction {
    InsertOne,
    FindOne,
    Find,
    UpdateOne,
    DeleteOne,
    UpsertProfile,
    GetProfile,
    SaveAnalysis,
    GetAnalysisHistory,
    DeleteAnalysis,
}

impl StoreAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreAction::InsertOne => "insertOne",
            StoreAction::FindOne => "findOne",
            StoreAction::Find => "find",
            StoreAction::UpdateOne => "updateOne",
            StoreAction::DeleteOne => "deleteOne",
            StoreAction::UpsertProfile => "upsertProfile",
            StoreAction::GetProfile => "getProfile",
            StoreAction::SaveAnalysis => "saveAnalysis",
            StoreAction::GetAnalysisHistory => "getAnalysisHistory",
            StoreAction::DeleteAnalysis => "deleteAnalysis",
        }
    }
}

impl fmt::Display for StoreAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "insertOne" => StoreAction::InsertOne,
            "findOne" => StoreAction::FindOne,
            "find" => StoreAction::Find,
            "updateOne" => StoreAction::UpdateOne,
            "deleteOne" => StoreAction::DeleteOne,
            "upsertProfile" => StoreAction::UpsertProfile,
            "getProfile" => StoreAction::GetProfile,
            "saveAnalysis" => StoreAction::SaveAnalysis,
            "getAnalysisHistory" => StoreAction::GetAnalysisHistory,
            "deleteAnalysis" => StoreAction::DeleteAnalysis,
            other => return Err(Error::UnknownAction(other.to_string())),
        })
    }
}

/// One protocol request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRequest {
    pub action: String,
    pub collection: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// One protocol response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StoreResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Value::Null,
            error: Some(message.into()),
        }
    }
}

impl StoreRequest {
    fn user_id(&self, action: StoreAction) -> Result<&str> {
        self.user_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::Validation(format!("userId is required for {}", action)))
    }

    fn data(&self) -> Document {
        self.data.clone().unwrap_or_default()
    }

    fn filter(&self) -> Filter {
        self.filter.clone().unwrap_or_default()
    }

    /// Run the request against `store`, returning the action's result payload
    pub fn execute<S: DocumentStore + ?Sized>(&self, store: &S) -> Result<Value> {
        let action: StoreAction = self.action.parse()?;
        let collection = self.collection.as_str();
        debug!(action = %action, collection = %collection, "Store action");

        let result = match action {
            StoreAction::InsertOne => {
                let id = store.insert_one(collection, self.data())?;
                json!({ "insertedId": id })
            }
            StoreAction::FindOne => store
                .find_one(collection, &self.filter())?
                .map(Value::Object)
                .unwrap_or(Value::Null),
            StoreAction::Find => Value::Array(
                store
                    .find(collection, &self.filter())?
                    .into_iter()
                    .map(Value::Object)
                    .collect(),
            ),
            StoreAction::UpdateOne => {
                let count = store.update_one(collection, &self.filter(), &self.data())?;
                json!({ "modifiedCount": count })
            }
            StoreAction::DeleteOne => {
                let count = store.delete_one(collection, &self.filter())?;
                json!({ "deletedCount": count })
            }
            StoreAction::UpsertProfile => {
                let user_id = self.user_id(action)?;
                serde_json::to_value(store.upsert_profile(collection, user_id, &self.data())?)?
            }
            StoreAction::GetProfile => store
                .get_profile(collection, self.user_id(action)?)?
                .map(Value::Object)
                .unwrap_or(Value::Null),
            StoreAction::SaveAnalysis => {
                let id = store.save_analysis(collection, self.user_id(action)?, self.data())?;
                json!({ "insertedId": id })
            }
            StoreAction::GetAnalysisHistory => Value::Array(
                store
                    .get_analysis_history(collection, self.user_id(action)?)?
                    .into_iter()
                    .map(Value::Object)
                    .collect(),
            ),
            StoreAction::DeleteAnalysis => {
                let user_id = self.user_id(action)?;
                let count = match self.filter.as_ref().and_then(|f| f.get("_id")).and_then(Value::as_str) {
                    Some(id) => store.delete_analysis(collection, user_id, id)?,
                    None => 0,
                };
                json!({ "deletedCount": count })
            }
        };

        Ok(result)
    }

    /// Run the request and wrap the outcome in a protocol response
    pub fn handle<S: DocumentStore + ?Sized>(&self, store: &S) -> StoreResponse {
        match self.execute(store) {
            Ok(data) => StoreResponse::ok(data),
            Err(e) => {
                warn!(action = %self.action, error = %e, "Store action failed");
                StoreResponse::failure(e.to_string())
            }
        }
    }
}
