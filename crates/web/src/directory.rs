//! Appointment routing: specialists and department mailboxes.

use crate::config::Brokerage;

/// A licensed agent who can be booked directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Specialist {
    /// Identifier used by the site's booking links.
    pub slug: &'static str,
    pub name: &'static str,
    /// Mailbox local part at the brokerage domain.
    pub mailbox: &'static str,
}

const SPECIALISTS: &[Specialist] = &[
    Specialist {
        slug: "alba-estevez",
        name: "Alba Estévez",
        mailbox: "alba.estevez",
    },
    Specialist {
        slug: "carlos-mendoza",
        name: "Carlos Mendoza",
        mailbox: "carlos.mendoza",
    },
    Specialist {
        slug: "lucia-ramirez",
        name: "Lucía Ramírez",
        mailbox: "lucia.ramirez",
    },
];

/// Look up a specialist by slug, case-insensitively.
pub fn find_specialist(slug: &str) -> Option<&'static Specialist> {
    let slug = slug.trim();
    SPECIALISTS.iter().find(|s| s.slug.eq_ignore_ascii_case(slug))
}

/// Department mailbox local part for an appointment type.
fn department_mailbox(appointment_type: &str) -> &'static str {
    match appointment_type.trim().to_ascii_lowercase().as_str() {
        "auto" | "home" | "renters" | "property" => "personal-lines",
        "life" | "health" | "medicare" => "life-health",
        "commercial" | "business" => "commercial",
        _ => "appointments",
    }
}

/// Where an appointment request's internal notification goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentRoute {
    pub recipient: String,
    pub cc: Option<String>,
    /// Addressee named in the CRM note.
    pub addressee: String,
    pub specialist: Option<&'static Specialist>,
}

/// Route an appointment request.
///
/// A known specialist overrides the department mailbox regardless of the
/// appointment type, and the fixed appointments CC is added.
pub fn route_appointment(brokerage: &Brokerage, agent: Option<&str>, appointment_type: &str) -> AppointmentRoute {
    match agent.and_then(find_specialist) {
        Some(specialist) => AppointmentRoute {
            recipient: brokerage.mailbox(specialist.mailbox),
            cc: Some(brokerage.appointment_cc.clone()),
            addressee: specialist.name.to_string(),
            specialist: Some(specialist),
        },
        None => {
            let mailbox = department_mailbox(appointment_type);
            AppointmentRoute {
                recipient: brokerage.mailbox(mailbox),
                cc: None,
                addressee: mailbox.to_string(),
                specialist: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brokerage() -> Brokerage {
        Brokerage::for_domain("Seguros del Sol", "segurosdelsol.com")
    }

    #[test]
    fn test_specialist_overrides_department() {
        for kind in ["auto", "life", "commercial", "something-else"] {
            let route = route_appointment(&brokerage(), Some("alba-estevez"), kind);
            assert_eq!(route.recipient, "alba.estevez@segurosdelsol.com");
            assert_eq!(route.cc.as_deref(), Some("appointments@segurosdelsol.com"));
            assert_eq!(route.addressee, "Alba Estévez");
        }
    }

    #[test]
    fn test_department_routing() {
        let route = route_appointment(&brokerage(), None, "Life");
        assert_eq!(route.recipient, "life-health@segurosdelsol.com");
        assert!(route.cc.is_none());

        let unknown_agent = route_appointment(&brokerage(), Some("nobody"), "auto");
        assert_eq!(unknown_agent.recipient, "personal-lines@segurosdelsol.com");
        assert!(unknown_agent.specialist.is_none());
    }
}
