//! Streaming parser for Secret Server XML exports.
//!
//! The reader dispatches on an explicit container state (which top-level
//! section is open) plus a tag-path stack for depth checks, so identically
//! named elements at different depths (`name` under a template vs. a template
//! field) cannot be confused.

use std::collections::HashMap;
use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::DelineaError;

/// Everything collected from one export document.
#[derive(Debug, Default)]
pub struct ParsedExport {
    /// Template definitions keyed by template name.
    pub templates: HashMap<String, Template>,
    /// Secrets in document order.
    pub secrets: Vec<SecretRecord>,
    /// Folders in document order.
    pub folders: Vec<FolderRecord>,
}

/// A secret template: field metadata keyed by slug (falling back to the
/// display name when the export carries no slug).
#[derive(Debug, Default, Clone)]
pub struct Template {
    /// Template display name.
    pub name: String,
    /// Field metadata by slug.
    pub fields: HashMap<String, TemplateField>,
}

/// Field metadata inside a template.
#[derive(Debug, Default, Clone)]
pub struct TemplateField {
    /// Display name of the field.
    pub field_name: String,
    /// Machine slug of the field.
    pub slug: String,
    /// Type hint, when the export flagged one.
    pub hint: Option<FieldHint>,
}

/// Boolean type hints a template can attach to a field. Only a small fixed
/// set of tags is meaningful; anything else at that depth is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldHint {
    /// `isurl` was true.
    Url,
    /// `ispassword` was true.
    Password,
    /// `isnotes` was true.
    Notes,
    /// `isfile` was true.
    File,
}

impl FieldHint {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "isurl" => Some(FieldHint::Url),
            "ispassword" => Some(FieldHint::Password),
            "isnotes" => Some(FieldHint::Notes),
            "isfile" => Some(FieldHint::File),
            _ => None,
        }
    }
}

/// One exported secret.
#[derive(Debug, Default, Clone)]
pub struct SecretRecord {
    /// Display name.
    pub name: String,
    /// Name of the template this secret was created from.
    pub template: String,
    /// Folder path as exported (backslash separated).
    pub folder: String,
    /// One-time-code seed, when the secret carries one.
    pub totp_seed: String,
    /// Field values in document order.
    pub fields: Vec<SecretField>,
}

/// A field value inside a secret.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SecretField {
    /// Display name of the field.
    pub field_name: String,
    /// Machine slug of the field.
    pub slug: String,
    /// Raw value.
    pub value: String,
}

impl SecretField {
    /// Lookup key: the slug, or the display name when no slug was exported.
    pub fn key(&self) -> &str {
        if self.slug.is_empty() {
            &self.field_name
        } else {
            &self.slug
        }
    }
}

/// One exported folder with its permission entries.
#[derive(Debug, Default, Clone)]
pub struct FolderRecord {
    /// Display name.
    pub name: String,
    /// Full path as exported (backslash separated).
    pub path: String,
    /// Permission entries in document order.
    pub permissions: Vec<PermissionEntry>,
}

/// A group or user grant on a folder.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PermissionEntry {
    /// Granted group name, empty for user grants.
    pub group_name: String,
    /// Granted user name, empty for group grants.
    pub user_name: String,
    /// Role on secrets inside the folder.
    pub secret_role: String,
    /// Role on the folder itself.
    pub folder_role: String,
}

const ROOT: &str = "ImportFile";

/// Which top-level section is currently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    None,
    Templates,
    Secrets,
    Folders,
}

impl Container {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "SecretTemplates" => Container::Templates,
            "Secrets" => Container::Secrets,
            "Folders" => Container::Folders,
            _ => Container::None,
        }
    }
}

#[derive(Default)]
struct ParserState {
    container: Container,
    stack: Vec<String>,
    out: ParsedExport,

    template: Option<Template>,
    template_field: Option<TemplateField>,
    secret: Option<SecretRecord>,
    secret_item: Option<SecretField>,
    folder: Option<FolderRecord>,
    permission: Option<PermissionEntry>,
}

impl Default for Container {
    fn default() -> Self {
        Container::None
    }
}

/// Parse an export document from a string slice.
pub fn parse_str(input: &str) -> Result<ParsedExport, DelineaError> {
    parse_reader(input.as_bytes())
}

/// Parse an export document from a buffered reader.
///
/// Fails on the first structural error; the output of a failed parse is
/// never partially usable.
pub fn parse_reader<R: BufRead>(input: R) -> Result<ParsedExport, DelineaError> {
    let mut reader = Reader::from_reader(input);
    // Tag balance must be verified: a mis-nested export aborts the run
    // instead of producing partial records.
    reader.config_mut().check_end_names = true;
    let mut state = ParserState::default();
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|source| {
            DelineaError::Parse {
                offset: reader.buffer_position() as u64,
                source,
            }
        })?;

        match event {
            Event::Start(start) => {
                let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                state.open(&tag)?;
            }
            Event::Empty(start) => {
                // Self-closing elements open and immediately close.
                let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                state.open(&tag)?;
                state.close();
            }
            Event::End(_) => state.close(),
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(quick_xml::Error::from)
                    .map_err(|source| DelineaError::Parse {
                        offset: reader.buffer_position() as u64,
                        source,
                    })?;
                state.text(&text);
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                state.text(&text);
            }
            Event::Eof => break,
            // Declarations, comments and processing instructions carry no
            // secret data.
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = state.stack.last() {
        return Err(DelineaError::Truncated(open.clone()));
    }

    Ok(state.out)
}

impl ParserState {
    fn open(&mut self, tag: &str) -> Result<(), DelineaError> {
        if self.stack.is_empty() && tag != ROOT {
            return Err(DelineaError::UnexpectedRoot(tag.to_owned()));
        }

        match self.stack.len() {
            // A child of the root selects the current container.
            1 => self.container = Container::from_tag(tag),

            // A child of a container opens a fresh in-progress record.
            2 => match (self.container, tag) {
                (Container::Templates, "secrettype") => self.template = Some(Template::default()),
                (Container::Secrets, "Secret") => self.secret = Some(SecretRecord::default()),
                (Container::Folders, "Folder") => self.folder = Some(FolderRecord::default()),
                _ => {}
            },

            // Nested units two levels below the record.
            4 => match (self.container, tag) {
                (Container::Templates, "field") if self.template.is_some() => {
                    self.template_field = Some(TemplateField::default());
                }
                (Container::Secrets, "SecretItem") if self.secret.is_some() => {
                    self.secret_item = Some(SecretField::default());
                }
                (Container::Folders, "Permission") if self.folder.is_some() => {
                    self.permission = Some(PermissionEntry::default());
                }
                _ => {}
            },

            _ => {}
        }

        self.stack.push(tag.to_owned());
        Ok(())
    }

    fn close(&mut self) {
        self.stack.pop();

        match self.stack.len() {
            1 => self.container = Container::None,

            // A record closed: finalize it into the output collections.
            2 => match self.container {
                Container::Templates => {
                    if let Some(template) = self.template.take() {
                        if !template.name.is_empty() {
                            self.out.templates.insert(template.name.clone(), template);
                        }
                    }
                }
                Container::Secrets => {
                    if let Some(secret) = self.secret.take() {
                        self.out.secrets.push(secret);
                    }
                }
                Container::Folders => {
                    if let Some(folder) = self.folder.take() {
                        self.out.folders.push(folder);
                    }
                }
                Container::None => {}
            },

            // A nested unit closed: attach it to its record.
            4 => match self.container {
                Container::Templates => {
                    if let (Some(template), Some(field)) =
                        (self.template.as_mut(), self.template_field.take())
                    {
                        let key = if field.slug.is_empty() {
                            field.field_name.clone()
                        } else {
                            field.slug.clone()
                        };
                        if !key.is_empty() {
                            template.fields.insert(key, field);
                        }
                    }
                }
                Container::Secrets => {
                    if let (Some(secret), Some(item)) =
                        (self.secret.as_mut(), self.secret_item.take())
                    {
                        if !item.key().is_empty() {
                            // A repeated key replaces the earlier value.
                            secret.fields.retain(|f| f.key() != item.key());
                            secret.fields.push(item);
                        }
                    }
                }
                Container::Folders => {
                    if let (Some(folder), Some(permission)) =
                        (self.folder.as_mut(), self.permission.take())
                    {
                        folder.permissions.push(permission);
                    }
                }
                Container::None => {}
            },

            _ => {}
        }
    }

    /// Character data for the currently open leaf. Text may arrive in
    /// fragments; every arm appends.
    fn text(&mut self, content: &str) {
        if self.stack.len() < 4 || content.is_empty() {
            return;
        }

        let depth = self.stack.len();
        let leaf = match self.stack.last() {
            Some(leaf) => leaf.as_str(),
            None => return,
        };

        match self.container {
            Container::Templates => {
                if depth == 4 && leaf == "name" {
                    if let Some(template) = self.template.as_mut() {
                        template.name.push_str(content);
                    }
                } else if depth == 6
                    && self.stack.get(3).map(String::as_str) == Some("fields")
                    && self.stack.get(4).map(String::as_str) == Some("field")
                {
                    if let Some(field) = self.template_field.as_mut() {
                        match leaf {
                            "fieldslugname" => field.slug.push_str(content),
                            "name" => field.field_name.push_str(content),
                            _ => {
                                if content == "true" {
                                    if let Some(hint) = FieldHint::from_tag(leaf) {
                                        field.hint = Some(hint);
                                    }
                                }
                            }
                        }
                    }
                }
            }

            Container::Secrets => {
                if depth == 4 {
                    if let Some(secret) = self.secret.as_mut() {
                        match leaf {
                            "SecretName" => secret.name.push_str(content),
                            "SecretTemplateName" => secret.template.push_str(content),
                            "FolderPath" => secret.folder.push_str(content),
                            "TotpKey" => secret.totp_seed.push_str(content),
                            _ => {}
                        }
                    }
                } else if depth == 6 {
                    if let Some(item) = self.secret_item.as_mut() {
                        match leaf {
                            "FieldName" => item.field_name.push_str(content),
                            "Slug" => item.slug.push_str(content),
                            "Value" => item.value.push_str(content),
                            _ => {}
                        }
                    }
                }
            }

            Container::Folders => {
                if depth == 4 {
                    if let Some(folder) = self.folder.as_mut() {
                        match leaf {
                            "FolderName" => folder.name.push_str(content),
                            "FolderPath" => folder.path.push_str(content),
                            _ => {}
                        }
                    }
                } else if depth == 6 {
                    if let Some(permission) = self.permission.as_mut() {
                        match leaf {
                            "GroupName" => permission.group_name.push_str(content),
                            "UserName" => permission.user_name.push_str(content),
                            "SecretAccessRoleName" => permission.secret_role.push_str(content),
                            "FolderAccessRoleName" => permission.folder_role.push_str(content),
                            _ => {}
                        }
                    }
                }
            }

            Container::None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ImportFile>
  <SecretTemplates>
    <secrettype>
      <name>Web Password</name>
      <fields>
        <field>
          <name>Password</name>
          <fieldslugname>password</fieldslugname>
          <ispassword>true</ispassword>
          <isnotes>false</isnotes>
        </field>
        <field>
          <name>URL</name>
          <fieldslugname>url</fieldslugname>
          <isurl>true</isurl>
        </field>
      </fields>
    </secrettype>
  </SecretTemplates>
  <Secrets>
    <Secret>
      <SecretName>Example Site</SecretName>
      <SecretTemplateName>Web Password</SecretTemplateName>
      <FolderPath>\Personal Folders\Work</FolderPath>
      <SecretItems>
        <SecretItem>
          <FieldName>Password</FieldName>
          <Slug>password</Slug>
          <Value>hunter2</Value>
        </SecretItem>
        <SecretItem>
          <FieldName>URL</FieldName>
          <Slug>url</Slug>
          <Value>https://example.com</Value>
        </SecretItem>
      </SecretItems>
    </Secret>
  </Secrets>
  <Folders>
    <Folder>
      <FolderName>Work</FolderName>
      <FolderPath>\Personal Folders\Work</FolderPath>
      <Permissions>
        <Permission>
          <GroupName>Engineering</GroupName>
          <UserName></UserName>
          <SecretAccessRoleName>View</SecretAccessRoleName>
          <FolderAccessRoleName>Edit</FolderAccessRoleName>
        </Permission>
      </Permissions>
    </Folder>
  </Folders>
</ImportFile>"#;

    #[test]
    fn parses_templates_secrets_and_folders() {
        let export = parse_str(SAMPLE).expect("well-formed export");

        assert_eq!(export.templates.len(), 1);
        assert_eq!(export.secrets.len(), 1);
        assert_eq!(export.folders.len(), 1);

        let template = export.templates.get("Web Password").expect("template");
        assert_eq!(template.fields.len(), 2);
        let password = template.fields.get("password").expect("password field");
        assert_eq!(password.field_name, "Password");
        assert_eq!(password.hint, Some(FieldHint::Password));
        let url = template.fields.get("url").expect("url field");
        assert_eq!(url.hint, Some(FieldHint::Url));

        let secret = &export.secrets[0];
        assert_eq!(secret.name, "Example Site");
        assert_eq!(secret.template, "Web Password");
        assert_eq!(secret.folder, r"\Personal Folders\Work");
        assert_eq!(secret.fields.len(), 2);
        assert_eq!(secret.fields[0].value, "hunter2");

        let folder = &export.folders[0];
        assert_eq!(folder.name, "Work");
        assert_eq!(folder.permissions.len(), 1);
        assert_eq!(folder.permissions[0].group_name, "Engineering");
        assert_eq!(folder.permissions[0].folder_role, "Edit");
    }

    #[test]
    fn rejects_unexpected_root() {
        let err = parse_str("<Export><Secrets/></Export>").expect_err("wrong root");
        assert!(matches!(err, DelineaError::UnexpectedRoot(tag) if tag == "Export"));
    }

    #[test]
    fn rejects_truncated_document() {
        let truncated = "<ImportFile><Secrets><Secret><SecretName>Cut";
        let err = parse_str(truncated).expect_err("truncated");
        assert!(matches!(
            err,
            DelineaError::Truncated(_) | DelineaError::Parse { .. }
        ));
    }

    #[test]
    fn rejects_mismatched_tags() {
        let bad = "<ImportFile><Secrets></Folders></ImportFile>";
        let err = parse_str(bad).expect_err("mismatched close");
        assert!(matches!(err, DelineaError::Parse { .. }));
    }

    #[test]
    fn entity_text_is_concatenated_across_fragments() {
        // The escaped ampersand splits the character data into several
        // fragments; the parser must append them all.
        let xml = r#"<ImportFile><Secrets><Secret>
            <SecretName>Fish &amp; Chips &amp; Co</SecretName>
        </Secret></Secrets></ImportFile>"#;

        let export = parse_str(xml).expect("well-formed");
        assert_eq!(export.secrets[0].name, "Fish & Chips & Co");
    }

    #[test]
    fn secret_with_no_fields_is_legal() {
        let xml = r#"<ImportFile><Secrets><Secret>
            <SecretName>Bare</SecretName>
            <SecretTemplateName>Mystery</SecretTemplateName>
        </Secret></Secrets></ImportFile>"#;

        let export = parse_str(xml).expect("well-formed");
        assert_eq!(export.secrets.len(), 1);
        assert!(export.secrets[0].fields.is_empty());
    }

    #[test]
    fn bool_hints_only_apply_to_known_tags() {
        let xml = r#"<ImportFile><SecretTemplates><secrettype>
            <name>T</name>
            <fields><field>
                <name>F</name>
                <fieldslugname>f</fieldslugname>
                <issomethingelse>true</issomethingelse>
            </field></fields>
        </secrettype></SecretTemplates></ImportFile>"#;

        let export = parse_str(xml).expect("well-formed");
        let field = &export.templates["T"].fields["f"];
        assert_eq!(field.hint, None);
    }

    #[test]
    fn name_under_template_and_under_field_stay_distinct() {
        let xml = r#"<ImportFile><SecretTemplates><secrettype>
            <name>Outer</name>
            <fields><field>
                <name>Inner</name>
                <fieldslugname>inner</fieldslugname>
            </field></fields>
        </secrettype></SecretTemplates></ImportFile>"#;

        let export = parse_str(xml).expect("well-formed");
        let template = &export.templates["Outer"];
        assert_eq!(template.name, "Outer");
        assert_eq!(template.fields["inner"].field_name, "Inner");
    }
}
