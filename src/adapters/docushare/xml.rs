//! DocuShare export XML parsing
//!
//! `dsexport` and the `/dsweb/Export` endpoint both emit a flat list of
//! `<dsobject>` elements:
//!
//! ```xml
//! <dsexport>
//!   <dsobject classname="Document" handle="Document-7">
//!     <props><prop name="title">Q1 Report</prop></props>
//!     <sourcelinks><containment>Collection-43</containment></sourcelinks>
//!     <versions>
//!       <dsobject classname="Version" handle="Version-9">
//!         <props><prop name="version_number">1</prop></props>
//!         <renditions>
//!           <dsobject classname="Rendition" handle="Rendition-9">
//!             <props><prop name="size">3</prop></props>
//!             <contentelements>
//!               <contentelement filename="File-9.bin">q1.pdf</contentelement>
//!             </contentelements>
//!           </dsobject>
//!         </renditions>
//!       </dsobject>
//!     </versions>
//!   </dsobject>
//! </dsexport>
//! ```
//!
//! The reader builds a small element tree with `quick-xml` and maps each
//! top-level object onto the domain model.

use crate::domain::collection::{Folder, Link, SortOrder, SourceObject};
use crate::domain::document::{Document, Rendition, Version};
use crate::domain::errors::{DumpError, SourceError};
use crate::domain::ids::ObjectHandle;
use crate::domain::result::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::HashMap;

/// Object classes that exist in DocuShare but are never exported
pub const IGNORED_CLASSES: &[&str] = &[
    "User",
    "Group",
    "BulletinBoard",
    "Bulletin",
    "Weblog",
    "WeblogEntry",
    "Event",
    "Calendar",
    "Wiki",
    "WikiPage",
];

/// Groups whose read access makes an object public
///
/// These are DocuShare's built-in site-wide groups. An object none of them
/// may read is private.
pub const PUBLIC_GROUPS: &[&str] = &["Group-4", "Group-5", "Group-7"];

/// Removes characters that are not allowed in XML 1.0 documents.
///
/// DocuShare exports occasionally contain raw control characters copied from
/// titles; they would otherwise abort parsing.
pub fn strip_illegal_xml_chars(input: &str) -> String {
    input
        .chars()
        .filter(|&c| {
            !matches!(c,
                '\u{00}'..='\u{08}' | '\u{0b}' | '\u{0c}' | '\u{0e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}')
        })
        .collect()
}

/// Parses a DocuShare timestamp such as `Mon Jan 05 10:00:00 CST 2015`.
///
/// The zone abbreviation is ambiguous and is dropped; the time is taken as UTC.
/// RFC 3339 timestamps are accepted as well.
pub fn parse_docushare_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    let mut tokens: Vec<&str> = value.split_whitespace().collect();
    if tokens.len() == 6 {
        tokens.remove(4);
    }
    NaiveDateTime::parse_from_str(&tokens.join(" "), "%a %b %d %H:%M:%S %Y")
        .ok()
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| invalid(format!("bad attribute in <{name}>: {e}")))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| invalid(format!("bad attribute value in <{name}>: {e}")))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            ..Default::default()
        })
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Elements reached by following `path` one child level at a time
    fn find_all<'a>(&'a self, path: &[&'a str]) -> Vec<&'a Element> {
        let mut current = vec![self];
        for step in path {
            current = current
                .into_iter()
                .flat_map(|e| e.children_named(*step))
                .collect();
        }
        current
    }

    fn text_of(&self, path: &[&str]) -> Option<String> {
        self.find_all(path)
            .into_iter()
            .map(|e| e.text.trim().to_string())
            .find(|t| !t.is_empty())
    }

    /// `<props><prop name="..">value</prop></props>`; the first value per name wins
    fn props(&self) -> HashMap<&str, String> {
        let mut props = HashMap::new();
        for prop in self.find_all(&["props", "prop"]) {
            if let Some(name) = prop.attr("name") {
                props
                    .entry(name)
                    .or_insert_with(|| prop.text.trim().to_string());
            }
        }
        props
    }
}

fn invalid(message: String) -> DumpError {
    DumpError::Source(SourceError::InvalidFormat(message))
}

fn parse_tree(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => stack.push(Element::from_start(e)?),
            Ok(Event::Empty(ref e)) => {
                let element = Element::from_start(e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(current) = stack.last_mut() {
                    let text = e
                        .unescape()
                        .map_err(|err| invalid(format!("bad text in <{}>: {err}", current.name)))?;
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| invalid("unbalanced closing tag".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(invalid(format!(
                    "XML parse error at position {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(invalid("unexpected end of document".to_string()));
    }
    root.ok_or_else(|| invalid("document has no root element".to_string()))
}

/// Parses an export document into source objects
///
/// Objects without a `classname` are skipped, as are objects whose handle is
/// malformed (with a warning). Illegal control characters are stripped first.
///
/// # Errors
///
/// Returns [`SourceError::InvalidFormat`] if the document is not well-formed XML.
pub fn parse_export(xml: &str) -> Result<Vec<SourceObject>> {
    let cleaned = strip_illegal_xml_chars(xml);
    let root = parse_tree(&cleaned)?;

    let mut objects = Vec::new();
    for element in root.children_named("dsobject") {
        let Some(class_name) = element.attr("classname") else {
            continue;
        };
        let handle = match element.attr("handle").map(ObjectHandle::new) {
            Some(Ok(handle)) => handle,
            Some(Err(e)) => {
                tracing::warn!(class_name, error = %e, "Skipping object with invalid handle");
                continue;
            }
            None => {
                tracing::warn!(class_name, "Skipping object without a handle");
                continue;
            }
        };

        let object = match class_name {
            "Collection" => SourceObject::Folder(parse_folder(element, handle)),
            "Document" => SourceObject::Document(parse_document(element, handle)?),
            "URL" => SourceObject::Link(parse_link(element, handle)),
            other => {
                if !IGNORED_CLASSES.contains(&other) {
                    tracing::debug!(handle = %handle, class_name = other, "Ignoring unknown object class");
                }
                SourceObject::Ignored {
                    handle,
                    class_name: other.to_string(),
                }
            }
        };
        objects.push(object);
    }

    tracing::debug!(count = objects.len(), "Parsed export listing");
    Ok(objects)
}

/// Whether an object's ACL denies read access to every public group
///
/// An object exported without an `<acls>` element carries no access
/// information and is treated as public.
fn is_private(element: &Element) -> bool {
    let acls = element.find_all(&["acls"]);
    if acls.is_empty() {
        return false;
    }
    !acls
        .into_iter()
        .flat_map(|acls| acls.children_named("acl"))
        .filter(|acl| acl.attr("principal").is_some_and(|p| PUBLIC_GROUPS.contains(&p)))
        .any(|acl| {
            acl.attr("permissions")
                .unwrap_or_default()
                .split(|c: char| !c.is_ascii_alphanumeric())
                .any(|permission| permission == "readobject")
        })
}

fn parent_of(element: &Element) -> Option<ObjectHandle> {
    element
        .text_of(&["sourcelinks", "containment"])
        .and_then(|text| ObjectHandle::new(text).ok())
}

fn handles_at(element: &Element, path: &[&str]) -> Vec<ObjectHandle> {
    element
        .find_all(path)
        .into_iter()
        .filter_map(|e| ObjectHandle::new(e.text.as_str()).ok())
        .collect()
}

fn parse_folder(element: &Element, handle: ObjectHandle) -> Folder {
    let props = element.props();
    let title = props.get("title").cloned().unwrap_or_default();

    let mut folder = Folder::new(handle, title);
    folder.parent = parent_of(element);
    folder.sort_order = props
        .get("sort_order")
        .map(|s| SortOrder::from_property(s))
        .unwrap_or_default();
    folder.created = props.get("create_date").and_then(|d| parse_docushare_date(d));
    folder.children = handles_at(element, &["destinationlinks", "containment"]);
    folder.private = is_private(element);
    folder
}

fn parse_link(element: &Element, handle: ObjectHandle) -> Link {
    let props = element.props();
    let title = props
        .get("title")
        .filter(|t| !t.is_empty())
        .cloned()
        .unwrap_or_else(|| handle.to_string());
    Link {
        url: props.get("url").cloned().unwrap_or_default(),
        parent: parent_of(element),
        private: is_private(element),
        title,
        handle,
    }
}

fn parse_rendition(element: &Element) -> Rendition {
    let props = element.props();
    let content = element
        .find_all(&["contentelements", "contentelement"])
        .into_iter()
        .next();

    Rendition {
        stored_name: content
            .and_then(|c| c.attr("filename"))
            .map(str::to_string)
            .filter(|s| !s.is_empty()),
        original_name: content
            .map(|c| c.text.trim().to_string())
            .filter(|s| !s.is_empty()),
        size: props.get("size").and_then(|s| s.parse().ok()),
        created: props.get("create_date").and_then(|d| parse_docushare_date(d)),
    }
}

fn parse_version(element: &Element) -> Option<Version> {
    let handle = ObjectHandle::new(element.attr("handle")?).ok()?;
    let props = element.props();
    let number = props
        .get("version_number")
        .and_then(|n| n.parse().ok())
        .unwrap_or(0);

    let renditions = element.find_all(&["renditions", "dsobject"]);
    if renditions.len() > 1 {
        tracing::warn!(
            version = %handle,
            count = renditions.len(),
            "Version has several renditions, using the first"
        );
    }

    let mut version = Version::new(handle, number);
    version.created = props.get("create_date").and_then(|d| parse_docushare_date(d));
    version.rendition = renditions.first().map(|r| parse_rendition(r));
    Some(version)
}

fn parse_document(element: &Element, handle: ObjectHandle) -> Result<Document> {
    let props = element.props();
    let versions: Vec<Version> = element
        .find_all(&["versions", "dsobject"])
        .into_iter()
        .filter_map(parse_version)
        .collect();

    let mut builder = Document::builder()
        .handle(handle.clone())
        .private(is_private(element));

    // Untitled documents take the name they were uploaded with
    let title = props.get("title").filter(|t| !t.is_empty()).cloned().or_else(|| {
        versions
            .iter()
            .filter_map(|v| v.rendition.as_ref())
            .find_map(|r| r.original_name.clone())
    });
    if let Some(title) = title {
        builder = builder.title(title);
    }
    if let Some(name) = props.get("original_file_name").filter(|n| !n.is_empty()) {
        builder = builder.original_file_name(name.clone());
    }
    if let Some(parent) = parent_of(element) {
        builder = builder.parent(parent);
    }
    if let Some(preferred) = handles_at(element, &["destinationlinks", "preferredVersion"])
        .into_iter()
        .next()
    {
        builder = builder.preferred_version(preferred);
    }
    for version in versions {
        builder = builder.version(version);
    }

    builder.build().map_err(|e| invalid(format!("{handle}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    const EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<dsexport>
  <dsobject classname="Collection" handle="Collection-42">
    <props>
      <prop name="title">Engineering</prop>
      <prop name="sort_order">TitleReversed</prop>
      <prop name="create_date">Mon Jan 05 10:00:00 CST 2015</prop>
    </props>
    <destinationlinks>
      <containment>Collection-43</containment>
      <containment>URL-5</containment>
      <owner>User-3</owner>
    </destinationlinks>
    <acls><acl principal="Group-4" permissions="readobject"/></acls>
  </dsobject>
  <dsobject classname="Collection" handle="Collection-43">
    <props><prop name="title">Reports</prop></props>
    <sourcelinks><containment>Collection-42</containment></sourcelinks>
    <destinationlinks><containment>Document-7</containment></destinationlinks>
    <acls>
      <acl principal="Group-4" permissions="readprops"/>
      <acl principal="User-3" permissions="readobject,writeobject"/>
    </acls>
  </dsobject>
  <dsobject classname="Document" handle="Document-7">
    <props>
      <prop name="title">Q1 &amp; Q2 Report</prop>
      <prop name="original_file_name">report.pdf</prop>
    </props>
    <sourcelinks><containment>Collection-43</containment></sourcelinks>
    <destinationlinks><preferredVersion>Version-8</preferredVersion></destinationlinks>
    <versions>
      <dsobject classname="Version" handle="Version-9">
        <props>
          <prop name="version_number">2</prop>
          <prop name="create_date">Tue Feb 10 08:30:00 CST 2015</prop>
        </props>
        <renditions>
          <dsobject classname="Rendition" handle="Rendition-9">
            <props><prop name="size">3</prop></props>
            <contentelements>
              <contentelement filename="File-9.bin">report-v2.pdf</contentelement>
            </contentelements>
          </dsobject>
        </renditions>
      </dsobject>
      <dsobject classname="Version" handle="Version-8">
        <props><prop name="version_number">1</prop></props>
        <renditions/>
      </dsobject>
    </versions>
  </dsobject>
  <dsobject classname="URL" handle="URL-5">
    <props>
      <prop name="title">Wiki</prop>
      <prop name="url">https://wiki.example.com</prop>
    </props>
    <sourcelinks><containment>Collection-42</containment></sourcelinks>
  </dsobject>
  <dsobject classname="User" handle="User-3">
    <props><prop name="username">jdoe</prop></props>
  </dsobject>
  <dsobject handle="Orphan-1"/>
</dsexport>"#;

    #[test]
    fn test_parse_export_objects() {
        let objects = parse_export(EXPORT).unwrap();
        assert_eq!(objects.len(), 5);

        let SourceObject::Folder(root) = &objects[0] else {
            panic!("expected folder");
        };
        assert_eq!(root.title, "Engineering");
        assert_eq!(root.sort_order, SortOrder::TitleReversed);
        assert!(root.parent.is_none());
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.created.unwrap().year(), 2015);

        let SourceObject::Folder(reports) = &objects[1] else {
            panic!("expected folder");
        };
        assert_eq!(reports.parent.as_ref().unwrap().as_str(), "Collection-42");
        assert_eq!(reports.sort_order, SortOrder::Title);

        let SourceObject::Link(link) = &objects[3] else {
            panic!("expected link");
        };
        assert_eq!(link.url, "https://wiki.example.com");

        assert!(matches!(objects[4], SourceObject::Ignored { .. }));
    }

    #[test]
    fn test_acl_marks_private_objects() {
        let objects = parse_export(EXPORT).unwrap();
        let private: Vec<bool> = objects
            .iter()
            .map(|object| match object {
                SourceObject::Folder(folder) => folder.private,
                SourceObject::Document(document) => document.private,
                SourceObject::Link(link) => link.private,
                SourceObject::Ignored { .. } => false,
            })
            .collect();

        // Readable by Group-4, owner-only, no ACL, no ACL
        assert_eq!(private[..4], [false, true, false, false]);
    }

    #[test]
    fn test_acl_read_by_any_public_group_is_public() {
        let xml = r#"<dsexport>
  <dsobject classname="URL" handle="URL-1">
    <props><prop name="url">https://a.example</prop></props>
    <acls><acl principal="Group-7" permissions="writeobject readobject"/></acls>
  </dsobject>
  <dsobject classname="URL" handle="URL-2">
    <props><prop name="url">https://b.example</prop></props>
    <acls/>
  </dsobject>
</dsexport>"#;
        let objects = parse_export(xml).unwrap();
        let [SourceObject::Link(shared), SourceObject::Link(restricted)] = &objects[..] else {
            panic!("expected two links");
        };
        assert!(!shared.private);
        assert!(restricted.private);
    }

    #[test]
    fn test_parse_document_versions_and_rendition() {
        let objects = parse_export(EXPORT).unwrap();
        let SourceObject::Document(document) = &objects[2] else {
            panic!("expected document");
        };

        assert_eq!(document.title, "Q1 & Q2 Report");
        assert_eq!(document.original_file_name.as_deref(), Some("report.pdf"));
        assert_eq!(document.versions.len(), 2);
        assert_eq!(document.preferred_version.as_ref().unwrap().as_str(), "Version-8");

        let latest = document.latest_version().unwrap();
        assert_eq!(latest.handle.as_str(), "Version-9");
        let rendition = latest.rendition.as_ref().unwrap();
        assert_eq!(rendition.stored_name.as_deref(), Some("File-9.bin"));
        assert_eq!(rendition.original_name.as_deref(), Some("report-v2.pdf"));
        assert_eq!(rendition.size, Some(3));

        let older = document.preferred().unwrap();
        assert!(older.rendition.is_none());
    }

    #[test]
    fn test_untitled_document_uses_uploaded_name() {
        let xml = r#"<dsexport>
  <dsobject classname="Document" handle="Document-1">
    <props/>
    <versions>
      <dsobject classname="Version" handle="Version-1">
        <renditions><dsobject classname="Rendition" handle="Rendition-1">
          <contentelements><contentelement filename="File-1">minutes.docx</contentelement></contentelements>
        </dsobject></renditions>
      </dsobject>
    </versions>
  </dsobject>
</dsexport>"#;
        let objects = parse_export(xml).unwrap();
        let SourceObject::Document(document) = &objects[0] else {
            panic!("expected document");
        };
        assert_eq!(document.title, "minutes.docx");
    }

    #[test]
    fn test_illegal_characters_are_stripped() {
        let xml = "<dsexport><dsobject classname=\"URL\" handle=\"URL-1\"><props>\
                   <prop name=\"title\">Bad\u{0b}Title\u{1f}</prop></props></dsobject></dsexport>";
        let objects = parse_export(xml).unwrap();
        let SourceObject::Link(link) = &objects[0] else {
            panic!("expected link");
        };
        assert_eq!(link.title, "BadTitle");
    }

    #[test]
    fn test_malformed_xml_is_invalid_format() {
        let result = parse_export("<dsexport><dsobject classname=\"Collection\">");
        assert!(matches!(
            result,
            Err(DumpError::Source(SourceError::InvalidFormat(_)))
        ));
    }

    #[test]
    fn test_parse_docushare_date() {
        let date = parse_docushare_date("Mon Jan 05 10:00:00 CST 2015").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2015, 1, 5));
        assert_eq!(date.hour(), 10);

        assert!(parse_docushare_date("2015-01-05T10:00:00Z").is_some());
        assert!(parse_docushare_date("yesterday").is_none());
    }
}
