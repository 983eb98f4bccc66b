//! Outgoing email messages.
//!
//! Bodies are deliberately plain: a heading, the facts, one link. Every
//! interpolated value is HTML-escaped since websites and report text come
//! from visitors and the reasoning service.

use std::fmt::Write as _;

use crate::domain::{Lang, VisibilityReport, VisibilityStatus};

/// A rendered email ready to hand to a [`super::Notifier`] backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
}

/// Builds the post-payment onboarding email.
#[must_use]
pub fn onboarding_email(site_url: &str, to: &str, website: Option<&str>) -> OutgoingEmail {
    let link = onboarding_link(site_url, to, website);
    let mut html = String::from("<h2>Welcome! Let's Get Started</h2>");
    html.push_str(
        "<p>Thank you for your purchase. Please complete a quick onboarding form so we can \
         create your personalized optimization plan.</p>",
    );
    let _ = write!(
        html,
        "<p><a href=\"{}\">Complete Onboarding Form</a></p>",
        escape_html(&link)
    );
    html.push_str("<p>This link will expire in 7 days.</p>");

    OutgoingEmail {
        to: to.to_string(),
        subject: "Welcome! Complete Your AI Visibility Setup".to_string(),
        html,
    }
}

/// Builds the email summarizing a visibility analysis.
#[must_use]
pub fn visibility_result_email(
    site_url: &str,
    to: &str,
    website: &str,
    report: &VisibilityReport,
    lang: Lang,
) -> OutgoingEmail {
    let pt = lang == Lang::Pt;
    let mut html = String::new();

    let _ = write!(
        html,
        "<h2>{}</h2><p>{} \"{}\"</p>",
        if pt { "Seu Resultado de Visibilidade IA" } else { "Your AI Visibility Result" },
        if pt { "Analisamos" } else { "We analyzed" },
        escape_html(website),
    );
    let _ = write!(
        html,
        "<p><strong>{}</strong> ({}/100)</p><ul>",
        status_label(report.status, lang),
        report.overall_score
    );
    for pillar in &report.pillars {
        let _ = write!(
            html,
            "<li>{}: {}/25 - {}</li>",
            escape_html(&pillar.name),
            pillar.score,
            escape_html(&pillar.description)
        );
    }
    html.push_str("</ul>");

    let (business, audience, location) = if pt {
        ("Negócio", "Público-alvo", "Localização")
    } else {
        ("Business", "Target audience", "Location")
    };
    let _ = write!(
        html,
        "<p>{business}: {}<br>{audience}: {}<br>{location}: {}</p>",
        escape_html(&report.business_description),
        escape_html(&report.target_audience),
        escape_html(&report.location),
    );

    html.push_str("<ul>");
    for gap in &report.gaps {
        let _ = write!(html, "<li>{}</li>", escape_html(gap));
    }
    html.push_str("</ul>");

    let _ = write!(
        html,
        "<p><a href=\"{}\">{}</a></p>",
        escape_html(site_url),
        if pt { "Solicitar Auditoria Gratuita" } else { "Request Free Audit" }
    );

    OutgoingEmail {
        to: to.to_string(),
        subject: (if pt { "Seu Resultado de Visibilidade IA" } else { "Your AI Visibility Result" })
            .to_string(),
        html,
    }
}

/// Localized tier label.
#[must_use]
pub const fn status_label(status: VisibilityStatus, lang: Lang) -> &'static str {
    match (lang, status) {
        (Lang::Pt, VisibilityStatus::Clear) => "CLARO",
        (Lang::Pt, VisibilityStatus::Partial) => "PARCIAL",
        (Lang::Pt, VisibilityStatus::NotClear) => "NÃO CLARO",
        (Lang::En, status) => status.label(),
    }
}

/// `<site>/onboarding?email=...[&website=...]` with query values encoded.
#[must_use]
pub fn onboarding_link(site_url: &str, email: &str, website: Option<&str>) -> String {
    let base = format!("{site_url}/onboarding");
    let mut params = vec![("email", email)];
    if let Some(website) = website {
        params.push(("website", website));
    }
    reqwest::Url::parse_with_params(&base, &params)
        .map(String::from)
        .unwrap_or(base)
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
