/// TwiML response document model
///
/// A response is an ordered list of verbs the telephony platform plays
/// back to the caller. Only the verbs this system emits are modelled:
/// `Say` (speak a line of text) and `Gather` (collect DTMF digits while
/// playing nested prompts).
use serde::{Deserialize, Serialize};

/// Spoken prompt verb
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Say {
    pub text: String,
}

impl Say {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Digit collection verb with nested prompts
///
/// The platform plays the nested `Say` verbs and collects up to
/// `num_digits` keypad digits while doing so.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gather {
    pub num_digits: Option<u32>,
    pub prompts: Vec<Say>,
}

impl Gather {
    pub fn new() -> Self {
        Self {
            num_digits: None,
            prompts: Vec::new(),
        }
    }

    /// Set the maximum number of digits to collect
    pub fn num_digits(mut self, n: u32) -> Self {
        self.num_digits = Some(n);
        self
    }

    /// Append a nested prompt
    pub fn say(mut self, say: Say) -> Self {
        self.prompts.push(say);
        self
    }
}

impl Default for Gather {
    fn default() -> Self {
        Self::new()
    }
}

/// A single response instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verb {
    Say(Say),
    Gather(Gather),
}

/// Ordered sequence of verbs sent back to the telephony platform
///
/// Built fresh each turn and handed off; the flow never retains it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwimlResponse {
    verbs: Vec<Verb>,
}

impl TwimlResponse {
    pub fn new() -> Self {
        Self { verbs: Vec::new() }
    }

    /// Append a spoken prompt
    pub fn say(&mut self, say: Say) -> &mut Self {
        self.verbs.push(Verb::Say(say));
        self
    }

    /// Append a digit-collection verb
    pub fn gather(&mut self, gather: Gather) -> &mut Self {
        self.verbs.push(Verb::Gather(gather));
        self
    }

    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }

    /// Count the caller-facing `Say` verbs at the top level
    pub fn say_count(&self) -> usize {
        self.verbs
            .iter()
            .filter(|v| matches!(v, Verb::Say(_)))
            .count()
    }

    /// Render the document as TwiML
    ///
    /// Rendering is deterministic: the same verb sequence always
    /// produces byte-identical output.
    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response>");
        for verb in &self.verbs {
            match verb {
                Verb::Say(say) => write_say(&mut xml, say),
                Verb::Gather(gather) => {
                    match gather.num_digits {
                        Some(n) => {
                            xml.push_str("<Gather numDigits=\"");
                            xml.push_str(&n.to_string());
                            xml.push_str("\">");
                        }
                        None => xml.push_str("<Gather>"),
                    }
                    for say in &gather.prompts {
                        write_say(&mut xml, say);
                    }
                    xml.push_str("</Gather>");
                }
            }
        }
        xml.push_str("</Response>");
        xml
    }
}

impl Default for TwimlResponse {
    fn default() -> Self {
        Self::new()
    }
}

fn write_say(xml: &mut String, say: &Say) {
    xml.push_str("<Say>");
    xml.push_str(&escape_text(&say.text));
    xml.push_str("</Say>");
}

/// Escape character data for XML text content
///
/// Quotes stay literal: only element text is emitted here, and the
/// platform's speech engine reads the text verbatim.
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_response() {
        let resp = TwimlResponse::new();
        assert!(resp.is_empty());
        assert_eq!(
            resp.to_xml(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response></Response>"
        );
    }

    #[test]
    fn test_say_rendering() {
        let mut resp = TwimlResponse::new();
        resp.say(Say::new("Hello caller."));

        assert_eq!(resp.say_count(), 1);
        assert_eq!(
            resp.to_xml(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Say>Hello caller.</Say></Response>"
        );
    }

    #[test]
    fn test_gather_rendering() {
        let gather = Gather::new()
            .num_digits(1)
            .say(Say::new("Press 1 for sales."))
            .say(Say::new("Press 2 for support."));

        let mut resp = TwimlResponse::new();
        resp.gather(gather);
        resp.say(Say::new("We did not receive any input."));

        assert_eq!(
            resp.to_xml(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response>\
             <Gather numDigits=\"1\"><Say>Press 1 for sales.</Say>\
             <Say>Press 2 for support.</Say></Gather>\
             <Say>We did not receive any input.</Say></Response>"
        );
    }

    #[test]
    fn test_gather_without_num_digits() {
        let mut resp = TwimlResponse::new();
        resp.gather(Gather::new().say(Say::new("Enter your extension.")));

        assert!(resp.to_xml().contains("<Gather><Say>"));
    }

    #[test]
    fn test_text_escaping() {
        let mut resp = TwimlResponse::new();
        resp.say(Say::new("Dave & Sons <opening hours>"));

        assert_eq!(
            resp.to_xml(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response>\
             <Say>Dave &amp; Sons &lt;opening hours&gt;</Say></Response>"
        );
    }

    #[test]
    fn test_quotes_stay_literal() {
        let mut resp = TwimlResponse::new();
        resp.say(Say::new("Sorry, I didn't get your response."));

        assert!(resp
            .to_xml()
            .contains("<Say>Sorry, I didn't get your response.</Say>"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let build = || {
            let mut resp = TwimlResponse::new();
            resp.gather(Gather::new().num_digits(1).say(Say::new("Press 1.")));
            resp.say(Say::new("Goodbye."));
            resp
        };

        let first = build();
        let second = build();
        assert_eq!(first, second);
        assert_eq!(first.to_xml(), second.to_xml());
    }

    #[test]
    fn test_json_serialization() {
        let gather = Gather::new().num_digits(1).say(Say::new("Press 1."));
        let mut resp = TwimlResponse::new();
        resp.gather(gather);

        let json = serde_json::to_string(&resp).unwrap();
        let deserialized: TwimlResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(resp, deserialized);
    }
}
