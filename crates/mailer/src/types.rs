/// An email message to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    /// Primary recipients
    pub to: Vec<String>,
    /// CC recipients
    pub cc: Vec<String>,
    /// Reply-To address
    pub reply_to: Option<String>,
    /// Email subject
    pub subject: String,
    /// Plain text body
    pub body: String,
    /// Optional HTML body
    pub html_body: Option<String>,
}

impl Email {
    /// Create a new email with a single recipient.
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: vec![to.into()],
            cc: Vec::new(),
            reply_to: None,
            subject: subject.into(),
            body: body.into(),
            html_body: None,
        }
    }

    /// Add a CC recipient.
    pub fn add_cc(&mut self, recipient: impl Into<String>) -> &mut Self {
        self.cc.push(recipient.into());
        self
    }

    /// Set the Reply-To address.
    pub fn with_reply_to(&mut self, address: impl Into<String>) -> &mut Self {
        self.reply_to = Some(address.into());
        self
    }

    /// Set the HTML body (creates multipart alternative with text fallback).
    pub fn with_html(&mut self, html: impl Into<String>) -> &mut Self {
        self.html_body = Some(html.into());
        self
    }
}
