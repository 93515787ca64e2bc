//! Rendering of an invitation into a standalone html document

use std::str::FromStr;

use chrono::{Locale, NaiveDateTime, TimeZone, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::invitation::InvitationRecord;

/// The language an invitation is rendered in
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum DisplayLocale {
    /// Brazilian Portuguese
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    /// American English
    #[serde(rename = "en-US")]
    EnUs,
}

struct Texts {
    lang: &'static str,
    locale: Locale,
    date_format: &'static str,
    date_label: &'static str,
    location_label: &'static str,
    image_alt: &'static str,
    rsvp_button: &'static str,
    organizer_label: &'static str,
    views_label: &'static str,
}

impl DisplayLocale {
    fn texts(self) -> Texts {
        match self {
            DisplayLocale::PtBr => Texts {
                lang: "pt-BR",
                locale: Locale::pt_BR,
                date_format: "%A, %-d de %B de %Y às %H:%M",
                date_label: "Data",
                location_label: "Local",
                image_alt: "Imagem do evento",
                rsvp_button: "Confirmar Presença via WhatsApp",
                organizer_label: "Organizado por",
                views_label: "visualizações",
            },
            DisplayLocale::EnUs => Texts {
                lang: "en-US",
                locale: Locale::en_US,
                date_format: "%A, %B %-d, %Y at %I:%M %p",
                date_label: "Date",
                location_label: "Location",
                image_alt: "Event image",
                rsvp_button: "RSVP via WhatsApp",
                organizer_label: "Organized by",
                views_label: "views",
            },
        }
    }

    fn rsvp_message(self, title: &str) -> String {
        match self {
            DisplayLocale::PtBr => format!(
                "Oi! Recebi seu convite para {title}. Gostaria de confirmar minha presença!"
            ),
            DisplayLocale::EnUs => format!(
                "Hi! I received your invitation to {title}. I would like to confirm my attendance!"
            ),
        }
    }
}

impl FromStr for DisplayLocale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pt-BR" | "pt_BR" => Ok(DisplayLocale::PtBr),
            "en-US" | "en_US" => Ok(DisplayLocale::EnUs),
            _ => Err(format!("Unsupported locale: {s}")),
        }
    }
}

/// Renders invitations as self-contained html documents
#[derive(Clone, Debug)]
pub struct TemplateRenderer {
    locale: DisplayLocale,
    country_code: String,
    messaging_host: String,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new(DisplayLocale::default(), "55", "wa.me")
    }
}

impl TemplateRenderer {
    /// Create a renderer.
    ///
    /// **Parameter**:
    /// - `locale`: Language of labels and dates
    /// - `country_code`: Calling code prefixed to RSVP phone numbers
    /// - `messaging_host`: Host of the messaging service deep link
    pub fn new(locale: DisplayLocale, country_code: &str, messaging_host: &str) -> Self {
        Self {
            locale,
            country_code: country_code.chars().filter(char::is_ascii_digit).collect(),
            messaging_host: messaging_host.trim_matches('/').to_string(),
        }
    }

    /// Format the event date in the long form of the display locale
    pub fn format_date(&self, date_time: NaiveDateTime) -> String {
        let texts = self.locale.texts();
        Utc.from_utc_datetime(&date_time)
            .format_localized(texts.date_format, texts.locale)
            .to_string()
    }

    /// The RSVP deep link, if the invitation has a phone number
    pub fn rsvp_link(&self, invitation: &InvitationRecord) -> Option<String> {
        let digits: String = invitation
            .whatsapp_number
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        if digits.is_empty() {
            return None;
        }

        let message = self.locale.rsvp_message(&invitation.title);
        Some(format!(
            "https://{}/{}{digits}?text={}",
            self.messaging_host,
            self.country_code,
            encode_uri_component(&message)
        ))
    }

    /// Render the full document
    pub fn render(&self, invitation: &InvitationRecord) -> String {
        let texts = self.locale.texts();
        let gradient = invitation.color_theme.gradient();
        let font = invitation.font_theme.font_stack();
        let title = escape_html(&invitation.title);

        let mut sections = vec![
            format!(r#"        <h1 class="title">🎉 {title}</h1>"#),
            format!(
                r#"        <div class="info"><strong>📅 {}:</strong> {}</div>"#,
                texts.date_label,
                escape_html(&self.format_date(invitation.event_date_time))
            ),
            format!(
                r#"        <div class="info"><strong>📍 {}:</strong> {}</div>"#,
                texts.location_label,
                escape_html(&invitation.location)
            ),
        ];

        if !invitation.description.trim().is_empty() {
            sections.push(format!(
                r#"        <div class="description">&quot;{}&quot;</div>"#,
                escape_html(&invitation.description)
            ));
        }

        if !invitation.images.is_empty() {
            sections.push(r#"        <div class="images">"#.to_string());
            sections.extend(invitation.images.iter().map(|image| {
                format!(
                    r#"            <img src="{}" alt="{}">"#,
                    escape_html(image),
                    texts.image_alt
                )
            }));
            sections.push("        </div>".to_string());
        }

        if let Some(link) = self.rsvp_link(invitation) {
            sections.push(format!(
                r#"        <a href="{}" class="rsvp-button" target="_blank" rel="noopener">💬 {}</a>"#,
                escape_html(&link),
                texts.rsvp_button
            ));
        }

        let views = if invitation.view_count > 0 {
            format!(
                r#"<div class="views">👀 {} {}</div>"#,
                invitation.view_count, texts.views_label
            )
        } else {
            String::new()
        };
        sections.push(format!(
            r#"        <div class="organizer">{}: <strong>{}</strong>{views}</div>"#,
            texts.organizer_label,
            escape_html(&invitation.organizer)
        ));

        let mut body = sections.join("\n");
        body.push('\n');

        format!(
            r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: {font};
            background: {gradient};
            min-height: 100vh;
            display: flex;
            align-items: center;
            justify-content: center;
            padding: 20px;
        }}
        .invitation {{
            background: white;
            border-radius: 25px;
            padding: 40px;
            max-width: 600px;
            width: 100%;
            text-align: center;
            box-shadow: 0 20px 40px rgba(0,0,0,0.3);
            animation: fadeIn 1s ease-in;
        }}
        @keyframes fadeIn {{
            from {{ opacity: 0; transform: translateY(30px); }}
            to {{ opacity: 1; transform: translateY(0); }}
        }}
        .title {{
            font-size: 2.5rem;
            color: #333;
            margin-bottom: 20px;
            background: {gradient};
            -webkit-background-clip: text;
            -webkit-text-fill-color: transparent;
            background-clip: text;
        }}
        .info {{
            font-size: 1.2rem;
            color: #555;
            margin: 15px 0;
            padding: 10px;
            border-left: 4px solid;
            border-image: {gradient} 1;
            text-align: left;
        }}
        .description {{
            font-size: 1.1rem;
            color: #666;
            margin: 20px 0;
            line-height: 1.6;
            font-style: italic;
        }}
        .images img {{
            width: 100%;
            max-width: 400px;
            border-radius: 15px;
            margin: 10px 0;
            box-shadow: 0 5px 15px rgba(0,0,0,0.2);
        }}
        .rsvp-button {{
            display: inline-block;
            background: #25D366;
            color: white;
            padding: 15px 30px;
            border-radius: 50px;
            text-decoration: none;
            font-size: 1.1rem;
            font-weight: bold;
            margin-top: 30px;
            transition: transform 0.2s;
        }}
        .rsvp-button:hover {{
            transform: translateY(-2px);
            box-shadow: 0 5px 15px rgba(37, 211, 102, 0.4);
        }}
        .organizer {{
            margin-top: 30px;
            padding-top: 20px;
            border-top: 2px solid #eee;
            color: #777;
            font-size: 0.9rem;
        }}
        .views {{
            margin-top: 8px;
            font-size: 0.8rem;
        }}
    </style>
</head>
<body>
    <div class="invitation">
{body}    </div>
</body>
</html>
"#,
            lang = texts.lang,
        )
    }
}

/// Escape text for use in html content and quoted attribute values
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c if c.is_control() && c != '\n' && c != '\t' => {
                out.push_str(&format!("&#{};", c as u32))
            }
            c => out.push(c),
        }
    }
    out
}

/// The `encodeURIComponent` set plus the apostrophe
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'(')
    .remove(b')');

/// Percent-encode like `encodeURIComponent`, the apostrophe is encoded as well
pub fn encode_uri_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;
    use crate::theme::{ColorTheme, FontTheme};

    fn record() -> InvitationRecord {
        InvitationRecord {
            uuid: Uuid::new_v4(),
            title: "Ana & Bia's party".to_string(),
            event_date_time: NaiveDate::from_ymd_opt(2025, 3, 15)
                .unwrap()
                .and_hms_opt(19, 0, 0)
                .unwrap(),
            location: "Rua das Flores 42".to_string(),
            description: "Bring your own cake".to_string(),
            organizer: "Ana".to_string(),
            whatsapp_number: "11999998888".to_string(),
            color_theme: ColorTheme::Purple,
            font_theme: FontTheme::Elegant,
            images: vec![
                "data:image/png;base64,Zmlyc3Q=".to_string(),
                "data:image/png;base64,c2Vjb25k".to_string(),
            ],
            view_count: 0,
            created_at: NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn full_invitation() {
        let renderer = TemplateRenderer::default();
        let invitation = record();
        let html = renderer.render(&invitation);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Ana &amp; Bia&#39;s party</title>"));
        assert!(html.contains("sábado, 15 de março de 2025 às 19:00"));
        assert!(html.contains(r#"<div class="description">&quot;Bring your own cake&quot;</div>"#));
        assert!(html.contains("Organizado por: <strong>Ana</strong>"));
        assert!(html.contains(ColorTheme::Purple.gradient()));
        assert!(html.contains(FontTheme::Elegant.font_stack()));

        assert_eq!(html.matches("class=\"rsvp-button\"").count(), 1);
        assert!(html.contains("https://wa.me/5511999998888?text="));
        assert!(html.contains(&encode_uri_component(&invitation.title)));

        let first = html.find("Zmlyc3Q=").unwrap();
        let second = html.find("c2Vjb25k").unwrap();
        assert!(first < second);
        assert!(!html.contains("class=\"views\""));
    }

    #[test]
    fn rendering_is_deterministic() {
        let renderer = TemplateRenderer::default();
        let invitation = record();
        assert_eq!(renderer.render(&invitation), renderer.render(&invitation));
    }

    #[test]
    fn empty_optional_sections_are_omitted() {
        let mut invitation = record();
        invitation.description.clear();
        invitation.whatsapp_number.clear();
        invitation.images.clear();

        let html = TemplateRenderer::default().render(&invitation);
        assert!(!html.contains("class=\"description\""));
        assert!(!html.contains("&quot;&quot;"));
        assert!(!html.contains("class=\"rsvp-button\""));
        assert!(!html.contains("wa.me"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn markup_is_escaped() {
        let mut invitation = record();
        invitation.title = "<script>alert(1)</script>".to_string();
        invitation.location = "<b>here</b>".to_string();
        invitation.description = "\"><img src=x onerror=alert(1)>".to_string();
        invitation.organizer = "Eve\u{0}<i>".to_string();

        let html = TemplateRenderer::default().render(&invitation);
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>"));
        assert!(!html.contains("<img src=x"));
        assert!(!html.contains("<i>"));
        assert!(!html.contains('\u{0}'));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("&lt;b&gt;here&lt;/b&gt;"));
        assert!(html.contains("Eve&#0;&lt;i&gt;"));
    }

    #[test]
    fn rsvp_link_normalizes_number() {
        let mut invitation = record();
        invitation.whatsapp_number = "(11) 99999-8888".to_string();
        invitation.title = "Festa & Bolo".to_string();

        let link = TemplateRenderer::new(DisplayLocale::PtBr, "+55", "wa.me/")
            .rsvp_link(&invitation)
            .unwrap();
        assert!(link.starts_with("https://wa.me/5511999998888?text=Oi!%20Recebi"));
        assert!(link.contains("Festa%20%26%20Bolo"));
        assert!(!link.contains(' '));
    }

    #[test]
    fn english_locale() {
        let html = TemplateRenderer::new(DisplayLocale::EnUs, "1", "wa.me").render(&record());
        assert!(html.contains("<html lang=\"en-US\">"));
        assert!(html.contains("Saturday, March 15, 2025 at 07:00 PM"));
        assert!(html.contains("https://wa.me/111999998888?text=Hi!"));
    }

    #[test]
    fn view_count_in_footer() {
        let mut invitation = record();
        invitation.view_count = 3;
        let html = TemplateRenderer::default().render(&invitation);
        assert!(html.contains("👀 3 visualizações"));
    }

    #[test]
    fn uri_component_encoding() {
        assert_eq!(encode_uri_component("a b&c"), "a%20b%26c");
        assert_eq!(encode_uri_component("ção"), "%C3%A7%C3%A3o");
        assert_eq!(encode_uri_component("it's (ok)!"), "it%27s%20(ok)!");
    }

    #[test]
    fn locales_parse() {
        assert_eq!("pt-BR".parse(), Ok(DisplayLocale::PtBr));
        assert_eq!("en_US".parse(), Ok(DisplayLocale::EnUs));
        assert!("xx".parse::<DisplayLocale>().is_err());
    }
}
