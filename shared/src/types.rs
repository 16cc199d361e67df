use std::fmt;
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use crate::protocol::WireService;

pub const DEFAULT_COLUMN_DELIMITER: &str = ",";
pub const DEFAULT_ROW_DELIMITER: &str = "\r\n";
pub const DEFAULT_TEXT_QUALIFIER: &str = "\"";
pub const DEFAULT_ENCODING: &str = "UTF-8";
pub const DEFAULT_ESCAPE_CHARACTER: &str = "\\";

/// Identifier assigned by the collection endpoint on create.
/// The endpoint may send it as a JSON number or a string; both read the same.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawId", into = "String")]
pub struct ServiceId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl From<RawId> for ServiceId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Number(n) => ServiceId(n.to_string()),
            RawId::Text(s) => ServiceId(s),
        }
    }
}

impl From<ServiceId> for String {
    fn from(id: ServiceId) -> Self {
        id.0
    }
}

impl ServiceId {
    pub fn new(id: impl Into<String>) -> Self {
        ServiceId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of external connection a linked service describes.
/// Wire tags are the endpoint's (`db`, `ai`, `file`); the long names are accepted too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ServiceType {
    #[default]
    #[serde(rename = "db", alias = "database")]
    Database,
    #[serde(rename = "ai", alias = "ai_api")]
    AiApi,
    #[serde(rename = "file")]
    File,
}

impl ServiceType {
    pub const ALL: [ServiceType; 3] = [ServiceType::Database, ServiceType::AiApi, ServiceType::File];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Database => "database",
            ServiceType::AiApi => "ai_api",
            ServiceType::File => "file",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthenticationType {
    #[default]
    Windows,
    Sql,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    #[default]
    Csv,
    Excel,
    Json,
    Xml,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Csv => "csv",
            FileType::Excel => "excel",
            FileType::Json => "json",
            FileType::Xml => "xml",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonLayout {
    #[default]
    Array,
    Lines,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XmlLayout {
    #[default]
    Element,
    Attribute,
}

/// Outcome of the last connection test. Only database services are ever tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Unknown,
    Success,
    Failed,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Unknown => "unknown",
            ConnectionStatus::Success => "success",
            ConnectionStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventLevel {
    Info,
    Warn,
    Error,
    Debug,
}

impl fmt::Display for EventLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventLevel::Info => "INFO",
            EventLevel::Warn => "WARN",
            EventLevel::Error => "ERROR",
            EventLevel::Debug => "DEBUG",
        };
        f.write_str(s)
    }
}

/// One entry of a service's status history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
    pub level: EventLevel,
    pub message: String,
}

impl Event {
    pub fn new(timestamp: DateTime<Utc>, level: EventLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            level,
            message: message.into(),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.level,
            self.message
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseAuth {
    Windows,
    Sql { username: String, password: String },
}

impl DatabaseAuth {
    pub fn authentication_type(&self) -> AuthenticationType {
        match self {
            DatabaseAuth::Windows => AuthenticationType::Windows,
            DatabaseAuth::Sql { .. } => AuthenticationType::Sql,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub server_name: String,
    pub database_name: String,
    pub auth: DatabaseAuth,
    pub trust_server_certificate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiApiConfig {
    pub api_key: String,
}

/// Parsing options shared by CSV and Excel sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimitedSettings {
    pub column_delimiter: String,
    pub row_delimiter: String,
    pub text_qualifier: String,
    pub first_row_as_header: bool,
    pub encoding: String,
    pub escape_character: String,
    pub null_value: String,
}

impl Default for DelimitedSettings {
    fn default() -> Self {
        Self {
            column_delimiter: DEFAULT_COLUMN_DELIMITER.to_string(),
            row_delimiter: DEFAULT_ROW_DELIMITER.to_string(),
            text_qualifier: DEFAULT_TEXT_QUALIFIER.to_string(),
            first_row_as_header: true,
            encoding: DEFAULT_ENCODING.to_string(),
            escape_character: DEFAULT_ESCAPE_CHARACTER.to_string(),
            null_value: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcelSettings {
    pub first_row_as_header: bool,
    pub sheet_name: String,
    pub range: String,
}

impl Default for ExcelSettings {
    fn default() -> Self {
        Self {
            first_row_as_header: true,
            sheet_name: String::new(),
            range: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonSettings {
    pub layout: JsonLayout,
    pub encoding: String,
}

impl Default for JsonSettings {
    fn default() -> Self {
        Self {
            layout: JsonLayout::default(),
            encoding: DEFAULT_ENCODING.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlSettings {
    pub layout: XmlLayout,
    pub root_element: String,
    pub row_element: String,
    pub encoding: String,
}

impl Default for XmlSettings {
    fn default() -> Self {
        Self {
            layout: XmlLayout::default(),
            root_element: String::new(),
            row_element: String::new(),
            encoding: DEFAULT_ENCODING.to_string(),
        }
    }
}

/// Format-specific settings of a file source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileFormat {
    Csv(DelimitedSettings),
    Excel(DelimitedSettings, ExcelSettings),
    Json(JsonSettings),
    Xml(XmlSettings),
}

impl FileFormat {
    pub fn file_type(&self) -> FileType {
        match self {
            FileFormat::Csv(_) => FileType::Csv,
            FileFormat::Excel(..) => FileType::Excel,
            FileFormat::Json(_) => FileType::Json,
            FileFormat::Xml(_) => FileType::Xml,
        }
    }

    /// Settings a fresh source of the given type starts with.
    pub fn defaults_for(file_type: FileType) -> Self {
        match file_type {
            FileType::Csv => FileFormat::Csv(DelimitedSettings::default()),
            FileType::Excel => FileFormat::Excel(DelimitedSettings::default(), ExcelSettings::default()),
            FileType::Json => FileFormat::Json(JsonSettings::default()),
            FileType::Xml => FileFormat::Xml(XmlSettings::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileConfig {
    pub file_name: String,
    pub file_size: u64,
    /// Base64 text of the uploaded bytes, without any data-URL prefix
    pub file_content: Option<String>,
    pub format: FileFormat,
}

/// The one field group a service carries, selected by its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceConfig {
    Database(DatabaseConfig),
    AiApi(AiApiConfig),
    File(FileConfig),
}

impl ServiceConfig {
    pub fn service_type(&self) -> ServiceType {
        match self {
            ServiceConfig::Database(_) => ServiceType::Database,
            ServiceConfig::AiApi(_) => ServiceType::AiApi,
            ServiceConfig::File(_) => ServiceType::File,
        }
    }
}

/// A configured external connection, as stored by the collection endpoint.
/// Transported as a flat camelCase object; see [`WireService`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireService", into = "WireService")]
pub struct LinkedService {
    pub id: Option<ServiceId>,
    pub name: String,
    pub description: String,
    pub config: ServiceConfig,
    pub connection_status: ConnectionStatus,
    pub connection_message: Option<String>,
    pub last_tested_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    /// Status history, newest last
    pub events: Vec<Event>,
}

impl LinkedService {
    pub fn service_type(&self) -> ServiceType {
        self.config.service_type()
    }

    /// One-line summary shown next to the name in list views.
    pub fn summary(&self) -> String {
        match &self.config {
            ServiceConfig::Database(db) if db.server_name.is_empty() => "DB - -".to_string(),
            ServiceConfig::Database(db) => format!("DB - {}/{}", db.server_name, db.database_name),
            ServiceConfig::AiApi(_) if self.description.is_empty() => format!("AI_API - {}", self.name),
            ServiceConfig::AiApi(_) => format!("AI_API - {}", self.description),
            ServiceConfig::File(file) => {
                let file_type = file.format.file_type().as_str().to_uppercase();
                if file.file_name.is_empty() {
                    format!("FILE - {}", file_type)
                } else {
                    format!("FILE - {} ({})", file_type, file.file_name)
                }
            }
        }
    }
}
