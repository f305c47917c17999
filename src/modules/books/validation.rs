//! Payload validation for book writes.
//!
//! Every accepted field is described once in [`BOOK_RULES`]. A payload is
//! checked against each rule in table order and all failures are collected,
//! so the caller sees one message per offending field, in declaration order.

use serde_json::{Map, Value};
use url::Url;

use super::models::{Book, BookDetails};

/// Which write a payload is validated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `isbn` is required in the body
    Create,
    /// `isbn` comes from the route; any body value is ignored
    Update,
}

/// Ordered, human-readable validation failures. Each message names its field.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{}", .messages.join("; "))]
pub struct ViolationList {
    messages: Vec<String>,
}

impl ViolationList {
    fn single(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }

    fn push(&mut self, message: String) {
        self.messages.push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

/// Payload coerced to the declared column types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedBook {
    /// Present only for [`Mode::Create`]
    pub isbn: Option<String>,
    pub details: BookDetails,
}

/// Writes accepted values into place while the payload is walked.
#[derive(Default)]
struct Draft {
    isbn: String,
    details: BookDetails,
}

/// How a single field is checked and where its value lands.
#[derive(Clone, Copy)]
enum Check {
    /// Non-empty string
    Text(fn(&mut Draft) -> &mut String),
    /// String that parses as an absolute URL
    Url(fn(&mut Draft) -> &mut String),
    /// Integer within `min..=max`
    Integer {
        min: i64,
        max: i64,
        expected: &'static str,
        slot: fn(&mut Draft) -> &mut i64,
    },
}

/// One entry of the declarative field table.
#[derive(Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    /// Key fields are only read from the body on create
    pub key: bool,
    check: Check,
}

impl FieldRule {
    fn applies_to(&self, mode: Mode) -> bool {
        !self.key || mode == Mode::Create
    }

    fn apply(&self, value: Option<&Value>, draft: &mut Draft) -> Result<(), String> {
        let name = self.name;
        let value = match value {
            None | Some(Value::Null) => return Err(format!("{name} is required")),
            Some(value) => value,
        };

        match self.check {
            Check::Text(slot) => match value.as_str() {
                Some(text) if !text.is_empty() => {
                    *slot(draft) = text.to_string();
                    Ok(())
                }
                _ => Err(format!("{name} must be a non-empty string")),
            },
            Check::Url(slot) => {
                let text = value
                    .as_str()
                    .ok_or_else(|| format!("{name} must be a string containing a URL"))?;
                Url::parse(text)
                    .map_err(|err| format!("{name} must be a valid absolute URL ({err})"))?;
                *slot(draft) = text.to_string();
                Ok(())
            }
            Check::Integer {
                min,
                max,
                expected,
                slot,
            } => match value.as_i64() {
                Some(number) if (min..=max).contains(&number) => {
                    *slot(draft) = number;
                    Ok(())
                }
                _ => Err(format!("{name} must be {expected}")),
            },
        }
    }
}

/// Field table for books, in declaration (and message) order.
pub static BOOK_RULES: [FieldRule; 8] = [
    FieldRule {
        name: "isbn",
        key: true,
        check: Check::Text(|draft| &mut draft.isbn),
    },
    FieldRule {
        name: "amazon_url",
        key: false,
        check: Check::Url(|draft| &mut draft.details.amazon_url),
    },
    FieldRule {
        name: "author",
        key: false,
        check: Check::Text(|draft| &mut draft.details.author),
    },
    FieldRule {
        name: "language",
        key: false,
        check: Check::Text(|draft| &mut draft.details.language),
    },
    FieldRule {
        name: "pages",
        key: false,
        check: Check::Integer {
            min: 1,
            max: i64::MAX,
            expected: "a positive integer",
            slot: |draft| &mut draft.details.pages,
        },
    },
    FieldRule {
        name: "publisher",
        key: false,
        check: Check::Text(|draft| &mut draft.details.publisher),
    },
    FieldRule {
        name: "title",
        key: false,
        check: Check::Text(|draft| &mut draft.details.title),
    },
    FieldRule {
        name: "year",
        key: false,
        check: Check::Integer {
            min: 1000,
            max: 9999,
            expected: "a four digit year",
            slot: |draft| &mut draft.details.year,
        },
    },
];

/// Check `payload` against [`BOOK_RULES`] for the given write.
///
/// Fields not named in the table are ignored.
pub fn validate(payload: &Value, mode: Mode) -> Result<NormalizedBook, ViolationList> {
    let draft = draft_from(payload, mode)?;

    Ok(NormalizedBook {
        isbn: (mode == Mode::Create).then_some(draft.isbn),
        details: draft.details,
    })
}

/// Validate a create payload into a full [`Book`].
pub fn validate_create(payload: &Value) -> Result<Book, ViolationList> {
    let draft = draft_from(payload, Mode::Create)?;
    Ok(Book::new(draft.isbn, draft.details))
}

/// Validate an update payload into the replacement column values.
pub fn validate_update(payload: &Value) -> Result<BookDetails, ViolationList> {
    draft_from(payload, Mode::Update).map(|draft| draft.details)
}

fn draft_from(payload: &Value, mode: Mode) -> Result<Draft, ViolationList> {
    let Some(fields) = payload.as_object() else {
        return Err(ViolationList::single("request body must be a JSON object"));
    };
    check_fields(fields, mode)
}

fn check_fields(fields: &Map<String, Value>, mode: Mode) -> Result<Draft, ViolationList> {
    let mut draft = Draft::default();
    let mut violations = ViolationList::default();

    for rule in BOOK_RULES.iter().filter(|rule| rule.applies_to(mode)) {
        if let Err(message) = rule.apply(fields.get(rule.name), &mut draft) {
            violations.push(message);
        }
    }

    if violations.is_empty() {
        Ok(draft)
    } else {
        Err(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_payload() -> Value {
        json!({
            "isbn": "0691161518",
            "amazon_url": "http://a.co/eobPtX2",
            "author": "Matthew Lane",
            "language": "english",
            "pages": 264,
            "publisher": "Princeton University Press",
            "title": "Power-Up: Unlocking the Hidden Mathematics in Video Games",
            "year": 2017
        })
    }

    #[test]
    fn accepts_complete_create_payload() {
        let book = validate_create(&valid_payload()).unwrap();

        assert_eq!(book.isbn, "0691161518");
        assert_eq!(book.details.amazon_url, "http://a.co/eobPtX2");
        assert_eq!(book.details.pages, 264);
        assert_eq!(book.details.year, 2017);
        assert_eq!(serde_json::to_value(&book).unwrap(), valid_payload());
    }

    #[test]
    fn rejects_malformed_url() {
        let mut payload = valid_payload();
        payload["amazon_url"] = json!("notaURL");

        let violations = validate(&payload, Mode::Create).unwrap_err();

        assert_eq!(violations.len(), 1);
        assert!(violations.messages()[0].contains("amazon_url"));
    }

    #[test]
    fn create_requires_isbn() {
        let mut payload = valid_payload();
        payload.as_object_mut().unwrap().remove("isbn");

        let violations = validate(&payload, Mode::Create).unwrap_err();
        assert_eq!(violations.messages(), ["isbn is required"]);

        let violations = validate_create(&payload).unwrap_err();
        assert_eq!(violations.messages(), ["isbn is required"]);
    }

    #[test]
    fn update_ignores_isbn_in_body() {
        let mut payload = valid_payload();
        payload["isbn"] = json!(42);

        let normalized = validate(&payload, Mode::Update).unwrap();
        assert_eq!(normalized.isbn, None);
        assert_eq!(normalized.details.author, "Matthew Lane");

        payload.as_object_mut().unwrap().remove("isbn");
        assert!(validate_update(&payload).is_ok());
    }

    #[test]
    fn violations_follow_declaration_order() {
        let payload = json!({
            "year": "2017",
            "title": "",
            "pages": 0,
            "amazon_url": 7,
            "isbn": "0691161518"
        });

        let violations = validate(&payload, Mode::Create).unwrap_err();
        let fields: Vec<&str> = violations
            .messages()
            .iter()
            .map(|message| message.split_whitespace().next().unwrap())
            .collect();

        assert_eq!(
            fields,
            ["amazon_url", "author", "language", "pages", "publisher", "title", "year"]
        );
    }

    #[test]
    fn rejects_wrong_types_and_ranges() {
        let mut payload = valid_payload();
        payload["pages"] = json!(-3);
        payload["year"] = json!(17);
        payload["author"] = json!(["Matthew", "Lane"]);
        payload["language"] = Value::Null;

        let violations = validate(&payload, Mode::Update).unwrap_err();

        assert_eq!(
            violations.messages(),
            [
                "author must be a non-empty string",
                "language is required",
                "pages must be a positive integer",
                "year must be a four digit year",
            ]
        );
    }

    #[test]
    fn fractional_numbers_are_not_integers() {
        let mut payload = valid_payload();
        payload["pages"] = json!(264.5);

        let violations = validate(&payload, Mode::Create).unwrap_err();
        assert!(violations.messages()[0].starts_with("pages"));
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let violations = validate(&json!(["isbn"]), Mode::Create).unwrap_err();
        assert_eq!(violations.messages(), ["request body must be a JSON object"]);

        for payload in [json!("book"), json!(null)] {
            let create = validate_create(&payload).unwrap_err();
            let update = validate_update(&payload).unwrap_err();
            assert_eq!(create.messages(), ["request body must be a JSON object"]);
            assert_eq!(update.messages(), create.messages());
        }
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let mut payload = valid_payload();
        payload["edition"] = json!("second");

        assert!(validate(&payload, Mode::Create).is_ok());
    }

    #[test]
    fn violation_list_display_joins_messages() {
        let violations = validate(&json!({}), Mode::Update).unwrap_err();
        assert_eq!(violations.len(), 7);
        assert!(violations.to_string().starts_with("amazon_url is required; author is required"));
    }
}
