//! Message templates.
//!
//! Each template is a Tera text template holding both languages, switched on
//! the `locale` variable. Substitution keys are snake_case
//! (`name`, `appointment_type`, ...). Optional keys may be left out; the
//! templates guard them with `{% if %}`.

use std::collections::BTreeMap;

use tera::{Context, Tera};

use crate::error::DispatchError;
use crate::locale::Locale;

/// Which message to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateKind {
    ContactInternal,
    ContactConfirmation,
    AppointmentInternal,
    AppointmentConfirmation,
    QuoteInternal,
    QuoteConfirmation,
    /// Caller-supplied body; substitutions use `{{ key }}` syntax.
    Custom(String),
}

impl TemplateKind {
    fn file_name(&self) -> Option<&'static str> {
        match self {
            TemplateKind::ContactInternal => Some("contact_internal.txt"),
            TemplateKind::ContactConfirmation => Some("contact_confirmation.txt"),
            TemplateKind::AppointmentInternal => Some("appointment_internal.txt"),
            TemplateKind::AppointmentConfirmation => Some("appointment_confirmation.txt"),
            TemplateKind::QuoteInternal => Some("quote_internal.txt"),
            TemplateKind::QuoteConfirmation => Some("quote_confirmation.txt"),
            TemplateKind::Custom(_) => None,
        }
    }

    fn subject(&self, locale: Locale) -> &'static str {
        match self {
            TemplateKind::ContactInternal => locale.pick(
                "New contact form submission: {{ subject }}",
                "Nuevo formulario de contacto: {{ subject }}",
            ),
            TemplateKind::ContactConfirmation => {
                locale.pick("We received your message", "Hemos recibido tu mensaje")
            }
            TemplateKind::AppointmentInternal => locale.pick(
                "New appointment request: {{ appointment_type }}",
                "Nueva solicitud de cita: {{ appointment_type }}",
            ),
            TemplateKind::AppointmentConfirmation => {
                locale.pick("Your appointment request", "Tu solicitud de cita")
            }
            TemplateKind::QuoteInternal => locale.pick(
                "New quote request: {{ insurance_type }}",
                "Nueva solicitud de cotización: {{ insurance_type }}",
            ),
            TemplateKind::QuoteConfirmation => {
                locale.pick("We're preparing your quote", "Estamos preparando tu cotización")
            }
            TemplateKind::Custom(_) => "{% if subject %}{{ subject }}{% else %}Message{% endif %}",
        }
    }
}

/// A rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub subject: String,
    pub body: String,
}

/// The compiled template set.
#[derive(Debug, Clone)]
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Compile the built-in templates.
    pub fn new() -> Result<Self, DispatchError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("contact_internal.txt", include_str!("../templates/contact_internal.txt")),
            ("contact_confirmation.txt", include_str!("../templates/contact_confirmation.txt")),
            ("appointment_internal.txt", include_str!("../templates/appointment_internal.txt")),
            (
                "appointment_confirmation.txt",
                include_str!("../templates/appointment_confirmation.txt"),
            ),
            ("quote_internal.txt", include_str!("../templates/quote_internal.txt")),
            ("quote_confirmation.txt", include_str!("../templates/quote_confirmation.txt")),
        ])?;
        Ok(Self { tera })
    }

    /// Render subject and body for `kind` in `locale`.
    pub fn render(
        &self,
        kind: &TemplateKind,
        locale: Locale,
        substitutions: &BTreeMap<String, String>,
    ) -> Result<Rendered, DispatchError> {
        let mut context = Context::new();
        for (key, value) in substitutions {
            context.insert(key.as_str(), value);
        }
        context.insert("locale", locale.code());

        let subject = Tera::one_off(kind.subject(locale), &context, false)?;
        let body = match kind {
            TemplateKind::Custom(body) => Tera::one_off(body, &context, false)?,
            _ => {
                let name = kind.file_name().unwrap_or_default();
                self.tera.render(name, &context)?
            }
        };

        Ok(Rendered {
            subject: subject.trim().to_string(),
            body: body.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_contact_confirmation_per_locale() {
        let templates = Templates::new().unwrap();
        let values = subs(&[("name", "Ana"), ("brokerage_name", "Seguros del Sol")]);

        let es = templates
            .render(&TemplateKind::ContactConfirmation, Locale::Es, &values)
            .unwrap();
        let en = templates
            .render(&TemplateKind::ContactConfirmation, Locale::En, &values)
            .unwrap();

        assert_eq!(es.subject, "Hemos recibido tu mensaje");
        assert!(es.body.starts_with("Hola Ana"));
        assert_eq!(en.subject, "We received your message");
        assert!(en.body.starts_with("Hi Ana"));
    }

    #[test]
    fn test_internal_subject_substitution_and_optional_fields() {
        let templates = Templates::new().unwrap();
        let values = subs(&[
            ("name", "Ana"),
            ("email", "ana@x.com"),
            ("subject", "General Inquiry"),
            ("message", "Hi"),
        ]);

        let rendered = templates
            .render(&TemplateKind::ContactInternal, Locale::En, &values)
            .unwrap();

        assert_eq!(rendered.subject, "New contact form submission: General Inquiry");
        assert!(rendered.body.contains("ana@x.com"));
        assert!(!rendered.body.contains("Phone:"));
    }

    #[test]
    fn test_custom_template() {
        let templates = Templates::new().unwrap();
        let values = subs(&[("name", "Luis")]);

        let rendered = templates
            .render(
                &TemplateKind::Custom("Hola {{ name }}, su póliza vence pronto.".to_string()),
                Locale::Es,
                &values,
            )
            .unwrap();

        assert_eq!(rendered.body, "Hola Luis, su póliza vence pronto.");
        assert_eq!(rendered.subject, "Message");
    }

    #[test]
    fn test_custom_template_with_missing_variable_fails() {
        let templates = Templates::new().unwrap();
        let result = templates.render(
            &TemplateKind::Custom("Hola {{ name }}".to_string()),
            Locale::Es,
            &BTreeMap::new(),
        );
        assert!(matches!(result, Err(DispatchError::Template(_))));
    }
}
