use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use crate::types::*;

/// Collection path, relative to the configured API base URL
pub const COLLECTION_PATH: &str = "linked-services";

/// Path segment appended to a service URL to run a connection test
pub const TEST_SEGMENT: &str = "test";

/// Flat camelCase representation the collection endpoint reads and writes.
/// Every group's keys live side by side here; only the active group is filled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WireService {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ServiceId>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<ServiceType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_type: Option<AuthenticationType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_server_certificate: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<FileType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_delimiter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_delimiter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_qualifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_row_as_header: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escape_character: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub null_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excel_first_row_as_header: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excel_sheet_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excel_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_format: Option<JsonLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml_format: Option<XmlLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml_root_element: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml_row_element: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_status: Option<ConnectionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_message: Option<String>,
    #[serde(with = "crate::timestamp::option", skip_serializing_if = "Option::is_none")]
    pub last_tested_at: Option<DateTime<Utc>>,
    #[serde(with = "crate::timestamp::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
}

/// Request body for create and update calls
pub type ServicePayload = WireService;

impl WireService {
    /// Strips everything the endpoint owns (id, status, history), leaving a
    /// create/update body.
    pub fn into_payload(mut self) -> ServicePayload {
        self.id = None;
        self.connection_status = None;
        self.connection_message = None;
        self.last_tested_at = None;
        self.created_at = None;
        self.events.clear();
        self
    }

    fn take_delimited(&mut self) -> DelimitedSettings {
        let defaults = DelimitedSettings::default();
        DelimitedSettings {
            column_delimiter: self.column_delimiter.take().unwrap_or(defaults.column_delimiter),
            row_delimiter: self.row_delimiter.take().unwrap_or(defaults.row_delimiter),
            text_qualifier: self.text_qualifier.take().unwrap_or(defaults.text_qualifier),
            first_row_as_header: self.first_row_as_header.unwrap_or(defaults.first_row_as_header),
            encoding: self.encoding.take().unwrap_or(defaults.encoding),
            escape_character: self.escape_character.take().unwrap_or(defaults.escape_character),
            null_value: self.null_value.take().unwrap_or(defaults.null_value),
        }
    }

    fn put_delimited(&mut self, settings: DelimitedSettings) {
        self.column_delimiter = Some(settings.column_delimiter);
        self.row_delimiter = Some(settings.row_delimiter);
        self.text_qualifier = Some(settings.text_qualifier);
        self.first_row_as_header = Some(settings.first_row_as_header);
        self.encoding = Some(settings.encoding);
        self.escape_character = Some(settings.escape_character);
        self.null_value = Some(settings.null_value);
    }

    fn take_format(&mut self) -> FileFormat {
        match self.file_type.unwrap_or_default() {
            FileType::Csv => FileFormat::Csv(self.take_delimited()),
            FileType::Excel => {
                let excel = ExcelSettings {
                    first_row_as_header: self.excel_first_row_as_header.unwrap_or(true),
                    sheet_name: self.excel_sheet_name.take().unwrap_or_default(),
                    range: self.excel_range.take().unwrap_or_default(),
                };
                FileFormat::Excel(self.take_delimited(), excel)
            }
            FileType::Json => FileFormat::Json(JsonSettings {
                layout: self.json_format.unwrap_or_default(),
                encoding: self.encoding.take().unwrap_or_else(|| DEFAULT_ENCODING.to_string()),
            }),
            FileType::Xml => FileFormat::Xml(XmlSettings {
                layout: self.xml_format.unwrap_or_default(),
                root_element: self.xml_root_element.take().unwrap_or_default(),
                row_element: self.xml_row_element.take().unwrap_or_default(),
                encoding: self.encoding.take().unwrap_or_else(|| DEFAULT_ENCODING.to_string()),
            }),
        }
    }
}

impl From<WireService> for LinkedService {
    fn from(mut wire: WireService) -> Self {
        // A missing tag means a database service
        let config = match wire.service_type.unwrap_or_default() {
            ServiceType::Database => {
                let auth = match wire.authentication_type.unwrap_or_default() {
                    AuthenticationType::Windows => DatabaseAuth::Windows,
                    AuthenticationType::Sql => DatabaseAuth::Sql {
                        username: wire.username.take().unwrap_or_default(),
                        password: wire.password.take().unwrap_or_default(),
                    },
                };
                ServiceConfig::Database(DatabaseConfig {
                    server_name: wire.server_name.take().unwrap_or_default(),
                    database_name: wire.database_name.take().unwrap_or_default(),
                    auth,
                    trust_server_certificate: wire.trust_server_certificate.unwrap_or(false),
                })
            }
            ServiceType::AiApi => ServiceConfig::AiApi(AiApiConfig {
                api_key: wire.ai_api_key.take().unwrap_or_default(),
            }),
            ServiceType::File => ServiceConfig::File(FileConfig {
                file_name: wire.file_name.take().unwrap_or_default(),
                file_size: wire.file_size.unwrap_or(0),
                file_content: wire.file_content.take(),
                format: wire.take_format(),
            }),
        };

        LinkedService {
            id: wire.id,
            name: wire.name,
            description: wire.description.unwrap_or_default(),
            config,
            connection_status: wire.connection_status.unwrap_or_default(),
            connection_message: wire.connection_message.filter(|m| !m.is_empty()),
            last_tested_at: wire.last_tested_at,
            created_at: wire.created_at,
            events: wire.events,
        }
    }
}

impl From<LinkedService> for WireService {
    fn from(service: LinkedService) -> Self {
        let mut wire = WireService {
            id: service.id,
            name: service.name,
            description: Some(service.description),
            service_type: Some(service.config.service_type()),
            connection_status: Some(service.connection_status),
            connection_message: service.connection_message,
            last_tested_at: service.last_tested_at,
            created_at: service.created_at,
            events: service.events,
            ..Default::default()
        };

        match service.config {
            ServiceConfig::Database(db) => {
                wire.server_name = Some(db.server_name);
                wire.database_name = Some(db.database_name);
                wire.authentication_type = Some(db.auth.authentication_type());
                wire.trust_server_certificate = Some(db.trust_server_certificate);
                if let DatabaseAuth::Sql { username, password } = db.auth {
                    wire.username = Some(username);
                    wire.password = Some(password);
                }
            }
            ServiceConfig::AiApi(ai) => {
                wire.ai_api_key = Some(ai.api_key);
            }
            ServiceConfig::File(file) => {
                wire.file_type = Some(file.format.file_type());
                wire.file_name = Some(file.file_name);
                wire.file_size = Some(file.file_size);
                wire.file_content = file.file_content;
                match file.format {
                    FileFormat::Csv(delimited) => wire.put_delimited(delimited),
                    FileFormat::Excel(delimited, excel) => {
                        wire.put_delimited(delimited);
                        wire.excel_first_row_as_header = Some(excel.first_row_as_header);
                        wire.excel_sheet_name = Some(excel.sheet_name);
                        wire.excel_range = Some(excel.range);
                    }
                    FileFormat::Json(json) => {
                        wire.json_format = Some(json.layout);
                        wire.encoding = Some(json.encoding);
                    }
                    FileFormat::Xml(xml) => {
                        wire.xml_format = Some(xml.layout);
                        wire.xml_root_element = Some(xml.root_element);
                        wire.xml_row_element = Some(xml.row_element);
                        wire.encoding = Some(xml.encoding);
                    }
                }
            }
        }

        wire
    }
}

/// Response of `POST /linked-services/<id>/test`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestOutcome {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<LinkedService>,
}

/// Structured rejection body (`{"error": "..."}`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
