//! Per-type field tables: what a form shows, what it requires, and what it
//! starts with. Form validation and field visibility are both resolved from
//! these tables so the two cannot drift apart.

use shared::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Description,
    ServiceType,
    ServerName,
    DatabaseName,
    AuthenticationType,
    TrustServerCertificate,
    Username,
    Password,
    AiApiKey,
    FileUpload,
    FileType,
    ColumnDelimiter,
    CustomDelimiter,
    RowDelimiter,
    TextQualifier,
    FirstRowAsHeader,
    Encoding,
    EscapeCharacter,
    NullValue,
    ExcelFirstRowAsHeader,
    ExcelSheetName,
    ExcelRange,
    JsonFormat,
    XmlFormat,
    XmlRootElement,
    XmlRowElement,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Description => "Description",
            Field::ServiceType => "Service Type",
            Field::ServerName => "Server Name",
            Field::DatabaseName => "Database Name",
            Field::AuthenticationType => "Authentication Type",
            Field::TrustServerCertificate => "Trust Server Certificate",
            Field::Username => "Username",
            Field::Password => "Password",
            Field::AiApiKey => "AI API Key",
            Field::FileUpload => "File",
            Field::FileType => "File Type",
            Field::ColumnDelimiter => "Column Delimiter",
            Field::CustomDelimiter => "Custom Delimiter",
            Field::RowDelimiter => "Row Delimiter",
            Field::TextQualifier => "Text Qualifier",
            Field::FirstRowAsHeader => "First Row as Header",
            Field::Encoding => "Encoding",
            Field::EscapeCharacter => "Escape Character",
            Field::NullValue => "Null Value",
            Field::ExcelFirstRowAsHeader => "First Row as Header",
            Field::ExcelSheetName => "Sheet Name",
            Field::ExcelRange => "Range",
            Field::JsonFormat => "JSON Format",
            Field::XmlFormat => "XML Format",
            Field::XmlRootElement => "Root Element",
            Field::XmlRowElement => "Row Element",
        }
    }

    /// Message for a failed required-field check. Fields checked together
    /// (server and database name, SQL credentials) share one message.
    pub fn rule_message(&self) -> &'static str {
        match self {
            Field::Name => "Please fill in the name field",
            Field::ServerName | Field::DatabaseName => "Please fill in Server Name and Database Name",
            Field::Username | Field::Password => "Username and password are required for SQL Authentication",
            Field::AiApiKey => "Please enter AI API Key",
            Field::FileUpload => "Please upload a file",
            _ => "Please fill in all required fields",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    RequiredForSqlAuth,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Always,
    SqlAuth,
    Formats(&'static [FileType]),
    CustomDelimiter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: Field,
    pub requirement: Requirement,
    pub visibility: Visibility,
    pub default: Option<&'static str>,
}

const fn spec(
    field: Field,
    requirement: Requirement,
    visibility: Visibility,
    default: Option<&'static str>,
) -> FieldSpec {
    FieldSpec { field, requirement, visibility, default }
}

use Requirement::*;
use Visibility::*;

const DELIMITED: &[FileType] = &[FileType::Csv, FileType::Excel];
const EXCEL: &[FileType] = &[FileType::Excel];
const JSON: &[FileType] = &[FileType::Json];
const XML: &[FileType] = &[FileType::Xml];

const COMMON_FIELDS: &[FieldSpec] = &[
    spec(Field::Name, Required, Always, None),
    spec(Field::Description, Optional, Always, None),
    spec(Field::ServiceType, Optional, Always, Some("database")),
];

const DATABASE_FIELDS: &[FieldSpec] = &[
    spec(Field::ServerName, Required, Always, None),
    spec(Field::DatabaseName, Required, Always, None),
    spec(Field::AuthenticationType, Optional, Always, Some("windows")),
    spec(Field::TrustServerCertificate, Optional, Always, Some("false")),
    spec(Field::Username, RequiredForSqlAuth, SqlAuth, None),
    spec(Field::Password, RequiredForSqlAuth, SqlAuth, None),
];

const AI_API_FIELDS: &[FieldSpec] = &[spec(Field::AiApiKey, Required, Always, None)];

const FILE_FIELDS: &[FieldSpec] = &[
    spec(Field::FileUpload, Required, Always, None),
    spec(Field::FileType, Optional, Always, Some("csv")),
    spec(Field::ColumnDelimiter, Optional, Formats(DELIMITED), Some(DEFAULT_COLUMN_DELIMITER)),
    spec(Field::CustomDelimiter, Optional, CustomDelimiter, None),
    spec(Field::RowDelimiter, Optional, Formats(DELIMITED), Some(DEFAULT_ROW_DELIMITER)),
    spec(Field::TextQualifier, Optional, Formats(DELIMITED), Some(DEFAULT_TEXT_QUALIFIER)),
    spec(Field::FirstRowAsHeader, Optional, Formats(DELIMITED), Some("true")),
    spec(Field::Encoding, Optional, Always, Some(DEFAULT_ENCODING)),
    spec(Field::EscapeCharacter, Optional, Formats(DELIMITED), Some(DEFAULT_ESCAPE_CHARACTER)),
    spec(Field::NullValue, Optional, Formats(DELIMITED), Some("")),
    spec(Field::ExcelFirstRowAsHeader, Optional, Formats(EXCEL), Some("true")),
    spec(Field::ExcelSheetName, Optional, Formats(EXCEL), Some("")),
    spec(Field::ExcelRange, Optional, Formats(EXCEL), Some("")),
    spec(Field::JsonFormat, Optional, Formats(JSON), Some("array")),
    spec(Field::XmlFormat, Optional, Formats(XML), Some("element")),
    spec(Field::XmlRootElement, Optional, Formats(XML), Some("")),
    spec(Field::XmlRowElement, Optional, Formats(XML), Some("")),
];

/// The form inputs that decide which fields apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormShape {
    pub service_type: ServiceType,
    pub authentication_type: AuthenticationType,
    pub file_type: FileType,
    pub custom_delimiter: bool,
}

impl FormShape {
    fn shows(&self, visibility: Visibility) -> bool {
        match visibility {
            Visibility::Always => true,
            Visibility::SqlAuth => self.authentication_type == AuthenticationType::Sql,
            Visibility::Formats(formats) => formats.contains(&self.file_type),
            Visibility::CustomDelimiter => {
                self.custom_delimiter && DELIMITED.contains(&self.file_type)
            }
        }
    }

    fn requires(&self, requirement: Requirement) -> bool {
        match requirement {
            Requirement::Required => true,
            Requirement::RequiredForSqlAuth => self.authentication_type == AuthenticationType::Sql,
            Requirement::Optional => false,
        }
    }
}

/// Common fields followed by one service type's group, in form order.
#[derive(Debug, Clone)]
pub struct FieldSet {
    service_type: ServiceType,
    specs: Vec<FieldSpec>,
}

impl FieldSet {
    pub fn service_type(&self) -> ServiceType {
        self.service_type
    }

    pub fn specs(&self) -> &[FieldSpec] {
        &self.specs
    }

    pub fn contains(&self, field: Field) -> bool {
        self.specs.iter().any(|s| s.field == field)
    }

    pub fn default_for(&self, field: Field) -> Option<&'static str> {
        self.specs.iter().find(|s| s.field == field).and_then(|s| s.default)
    }

    /// Fields to show for the given shape.
    pub fn visible(&self, shape: &FormShape) -> Vec<Field> {
        self.specs
            .iter()
            .filter(|s| shape.shows(s.visibility))
            .map(|s| s.field)
            .collect()
    }

    /// Fields that must be filled in for the given shape, in check order.
    pub fn required(&self, shape: &FormShape) -> Vec<Field> {
        self.specs
            .iter()
            .filter(|s| shape.shows(s.visibility) && shape.requires(s.requirement))
            .map(|s| s.field)
            .collect()
    }
}

pub fn fields_for(service_type: ServiceType) -> FieldSet {
    let group = match service_type {
        ServiceType::Database => DATABASE_FIELDS,
        ServiceType::AiApi => AI_API_FIELDS,
        ServiceType::File => FILE_FIELDS,
    };
    FieldSet {
        service_type,
        specs: COMMON_FIELDS.iter().chain(group).copied().collect(),
    }
}

/// Only database services support a connection test.
pub fn is_testable(service_type: ServiceType) -> bool {
    matches!(service_type, ServiceType::Database)
}
