//! The editable draft behind the detail view.
//!
//! A draft keeps the inputs of every service type at once, so switching the
//! type back and forth never loses what was typed; only the active group is
//! validated and submitted.

use shared::protocol::{ServicePayload, WireService};
use shared::types::*;
use crate::error::{ManagerError, ValidationError};
use crate::gateway::PersistenceGateway;
use crate::schema::{self, Field, FormShape};
use crate::upload::{self, Attachment};

/// Column delimiter selector. `Custom` takes its value from the custom text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DelimiterChoice {
    #[default]
    Comma,
    Semicolon,
    Tab,
    Pipe,
    NoDelimiter,
    Custom,
}

impl DelimiterChoice {
    pub fn preset(&self) -> Option<&'static str> {
        match self {
            DelimiterChoice::Comma => Some(","),
            DelimiterChoice::Semicolon => Some(";"),
            DelimiterChoice::Tab => Some("\t"),
            DelimiterChoice::Pipe => Some("|"),
            DelimiterChoice::NoDelimiter => Some(""),
            DelimiterChoice::Custom => None,
        }
    }

    /// Maps a stored delimiter onto the selector and the custom text field.
    pub fn from_stored(stored: Option<&str>) -> (Self, String) {
        let choice = match stored {
            None | Some(",") => DelimiterChoice::Comma,
            Some(";") => DelimiterChoice::Semicolon,
            Some("\t") => DelimiterChoice::Tab,
            Some("|") => DelimiterChoice::Pipe,
            Some("") => DelimiterChoice::NoDelimiter,
            Some(other) => return (DelimiterChoice::Custom, other.to_string()),
        };
        (choice, String::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DatabaseDraft {
    pub server_name: String,
    pub database_name: String,
    pub authentication_type: AuthenticationType,
    pub username: String,
    pub password: String,
    pub trust_server_certificate: bool,
}

impl DatabaseDraft {
    fn from_config(config: &DatabaseConfig) -> Self {
        let (username, password) = match &config.auth {
            DatabaseAuth::Sql { username, password } => (username.clone(), password.clone()),
            DatabaseAuth::Windows => (String::new(), String::new()),
        };
        Self {
            server_name: config.server_name.clone(),
            database_name: config.database_name.clone(),
            authentication_type: config.auth.authentication_type(),
            username,
            password,
            trust_server_certificate: config.trust_server_certificate,
        }
    }

    fn to_config(&self) -> DatabaseConfig {
        let auth = match self.authentication_type {
            AuthenticationType::Windows => DatabaseAuth::Windows,
            AuthenticationType::Sql => DatabaseAuth::Sql {
                username: self.username.trim().to_string(),
                password: self.password.clone(),
            },
        };
        DatabaseConfig {
            server_name: self.server_name.trim().to_string(),
            database_name: self.database_name.trim().to_string(),
            auth,
            trust_server_certificate: self.trust_server_certificate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AiApiDraft {
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDraft {
    pub file_type: FileType,
    /// File picked for this save; files are re-uploaded on every save
    pub attachment: Option<Attachment>,
    /// Name of the file the stored service currently holds
    pub existing_file: Option<String>,
    pub column_delimiter: DelimiterChoice,
    pub custom_delimiter: String,
    pub row_delimiter: String,
    pub text_qualifier: String,
    pub first_row_as_header: bool,
    pub encoding: String,
    pub escape_character: String,
    pub null_value: String,
    pub excel_first_row_as_header: bool,
    pub excel_sheet_name: String,
    pub excel_range: String,
    pub json_format: JsonLayout,
    pub xml_format: XmlLayout,
    pub xml_root_element: String,
    pub xml_row_element: String,
}

impl Default for FileDraft {
    fn default() -> Self {
        let delimited = DelimitedSettings::default();
        let excel = ExcelSettings::default();
        let xml = XmlSettings::default();
        Self {
            file_type: FileType::default(),
            attachment: None,
            existing_file: None,
            column_delimiter: DelimiterChoice::default(),
            custom_delimiter: String::new(),
            row_delimiter: delimited.row_delimiter,
            text_qualifier: delimited.text_qualifier,
            first_row_as_header: delimited.first_row_as_header,
            encoding: delimited.encoding,
            escape_character: delimited.escape_character,
            null_value: delimited.null_value,
            excel_first_row_as_header: excel.first_row_as_header,
            excel_sheet_name: excel.sheet_name,
            excel_range: excel.range,
            json_format: JsonLayout::default(),
            xml_format: xml.layout,
            xml_root_element: xml.root_element,
            xml_row_element: xml.row_element,
        }
    }
}

impl FileDraft {
    fn from_config(config: &FileConfig) -> Self {
        let mut draft = FileDraft {
            file_type: config.format.file_type(),
            existing_file: Some(config.file_name.clone()).filter(|n| !n.is_empty()),
            ..Default::default()
        };
        match &config.format {
            FileFormat::Csv(delimited) => draft.load_delimited(delimited),
            FileFormat::Excel(delimited, excel) => {
                draft.load_delimited(delimited);
                draft.excel_first_row_as_header = excel.first_row_as_header;
                draft.excel_sheet_name = excel.sheet_name.clone();
                draft.excel_range = excel.range.clone();
            }
            FileFormat::Json(json) => {
                draft.json_format = json.layout;
                draft.encoding = json.encoding.clone();
            }
            FileFormat::Xml(xml) => {
                draft.xml_format = xml.layout;
                draft.xml_root_element = xml.root_element.clone();
                draft.xml_row_element = xml.row_element.clone();
                draft.encoding = xml.encoding.clone();
            }
        }
        draft
    }

    fn load_delimited(&mut self, settings: &DelimitedSettings) {
        let (choice, custom) = DelimiterChoice::from_stored(Some(&settings.column_delimiter));
        self.column_delimiter = choice;
        self.custom_delimiter = custom;
        self.row_delimiter = settings.row_delimiter.clone();
        self.text_qualifier = settings.text_qualifier.clone();
        self.first_row_as_header = settings.first_row_as_header;
        self.encoding = settings.encoding.clone();
        self.escape_character = settings.escape_character.clone();
        self.null_value = settings.null_value.clone();
    }

    fn delimited(&self) -> DelimitedSettings {
        let column_delimiter = match self.column_delimiter.preset() {
            Some(preset) => preset.to_string(),
            None if self.custom_delimiter.is_empty() => DEFAULT_COLUMN_DELIMITER.to_string(),
            None => self.custom_delimiter.clone(),
        };
        DelimitedSettings {
            column_delimiter,
            row_delimiter: self.row_delimiter.clone(),
            text_qualifier: self.text_qualifier.clone(),
            first_row_as_header: self.first_row_as_header,
            encoding: self.encoding.clone(),
            escape_character: self.escape_character.clone(),
            null_value: self.null_value.clone(),
        }
    }

    fn format(&self) -> FileFormat {
        match self.file_type {
            FileType::Csv => FileFormat::Csv(self.delimited()),
            FileType::Excel => FileFormat::Excel(
                self.delimited(),
                ExcelSettings {
                    first_row_as_header: self.excel_first_row_as_header,
                    sheet_name: self.excel_sheet_name.trim().to_string(),
                    range: self.excel_range.trim().to_string(),
                },
            ),
            FileType::Json => FileFormat::Json(JsonSettings {
                layout: self.json_format,
                encoding: self.encoding.clone(),
            }),
            FileType::Xml => FileFormat::Xml(XmlSettings {
                layout: self.xml_format,
                root_element: self.xml_root_element.trim().to_string(),
                row_element: self.xml_row_element.trim().to_string(),
                encoding: self.encoding.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Draft {
    /// Set when the draft edits a stored service
    pub id: Option<ServiceId>,
    pub name: String,
    pub description: String,
    pub service_type: ServiceType,
    pub database: DatabaseDraft,
    pub ai_api: AiApiDraft,
    pub file: FileDraft,
}

impl Draft {
    pub fn from_record(record: &LinkedService) -> Self {
        let mut draft = Draft {
            id: record.id.clone(),
            name: record.name.clone(),
            description: record.description.clone(),
            service_type: record.service_type(),
            ..Default::default()
        };
        match &record.config {
            ServiceConfig::Database(db) => draft.database = DatabaseDraft::from_config(db),
            ServiceConfig::AiApi(ai) => draft.ai_api.api_key = ai.api_key.clone(),
            ServiceConfig::File(file) => draft.file = FileDraft::from_config(file),
        }
        draft
    }

    pub fn shape(&self) -> FormShape {
        FormShape {
            service_type: self.service_type,
            authentication_type: self.database.authentication_type,
            file_type: self.file.file_type,
            custom_delimiter: self.file.column_delimiter == DelimiterChoice::Custom,
        }
    }

    fn is_filled(&self, field: Field) -> bool {
        let text = match field {
            Field::Name => &self.name,
            Field::ServerName => &self.database.server_name,
            Field::DatabaseName => &self.database.database_name,
            Field::Username => &self.database.username,
            Field::Password => return !self.database.password.is_empty(),
            Field::AiApiKey => &self.ai_api.api_key,
            Field::FileUpload => return self.file.attachment.is_some(),
            _ => return true,
        };
        !text.trim().is_empty()
    }
}

/// Owns the draft being edited and turns it into create/update requests.
#[derive(Debug, Clone, Default)]
pub struct FormController {
    draft: Draft,
    baseline: Draft,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    /// Copies a stored service into the form, or resets it for a new one.
    pub fn load_draft(&mut self, record: Option<&LinkedService>) {
        self.draft = record.map(Draft::from_record).unwrap_or_default();
        self.baseline = self.draft.clone();
    }

    /// True once the draft differs from what was loaded.
    pub fn has_pending_edits(&self) -> bool {
        self.draft != self.baseline
    }

    pub fn set_service_type(&mut self, service_type: ServiceType) {
        self.draft.service_type = service_type;
    }

    /// Leaving SQL authentication clears the credentials.
    pub fn set_authentication_type(&mut self, authentication_type: AuthenticationType) {
        let database = &mut self.draft.database;
        database.authentication_type = authentication_type;
        if authentication_type == AuthenticationType::Windows {
            database.username.clear();
            database.password.clear();
        }
    }

    pub fn set_file_type(&mut self, file_type: FileType) {
        self.draft.file.file_type = file_type;
    }

    /// Attaches a file and switches the file type to match its extension.
    pub fn attach(&mut self, attachment: Attachment) {
        if let Some(file_type) = attachment.detected_file_type() {
            self.draft.file.file_type = file_type;
        }
        self.draft.file.attachment = Some(attachment);
    }

    pub fn visible_fields(&self) -> Vec<Field> {
        let shape = self.draft.shape();
        schema::fields_for(shape.service_type).visible(&shape)
    }

    /// Checks the active group's required fields and reports the first rule broken.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let shape = self.draft.shape();
        let required = schema::fields_for(shape.service_type).required(&shape);

        let Some(first) = required.iter().copied().find(|f| !self.draft.is_filled(*f)) else {
            return Ok(());
        };
        let message = first.rule_message();
        let missing = required
            .into_iter()
            .filter(|f| f.rule_message() == message && !self.draft.is_filled(*f))
            .collect();

        Err(ValidationError { missing, message })
    }

    /// Assembles the request body for the active group. For file services the
    /// attachment is read and encoded in full first.
    pub async fn build_payload(&self) -> Result<ServicePayload, ManagerError> {
        let draft = &self.draft;
        let config = match draft.service_type {
            ServiceType::Database => ServiceConfig::Database(draft.database.to_config()),
            ServiceType::AiApi => ServiceConfig::AiApi(AiApiConfig {
                api_key: draft.ai_api.api_key.trim().to_string(),
            }),
            ServiceType::File => {
                let attachment = draft.file.attachment.as_ref().ok_or(ValidationError {
                    missing: vec![Field::FileUpload],
                    message: Field::FileUpload.rule_message(),
                })?;
                let encoded = upload::encode(attachment).await?;
                ServiceConfig::File(FileConfig {
                    file_name: encoded.name,
                    file_size: encoded.size,
                    file_content: Some(encoded.content),
                    format: draft.file.format(),
                })
            }
        };

        let service = LinkedService {
            id: None,
            name: draft.name.trim().to_string(),
            description: draft.description.trim().to_string(),
            config,
            connection_status: ConnectionStatus::default(),
            connection_message: None,
            last_tested_at: None,
            created_at: None,
            events: Vec::new(),
        };
        Ok(WireService::from(service).into_payload())
    }

    /// Validates, builds and sends the draft: update when it is bound to an
    /// id, create otherwise. The draft itself is left untouched.
    pub async fn submit(&self, gateway: &dyn PersistenceGateway) -> Result<LinkedService, ManagerError> {
        self.validate()?;
        let payload = self.build_payload().await?;
        match &self.draft.id {
            Some(id) => gateway.update(id, &payload).await,
            None => gateway.create(&payload).await,
        }
    }
}
