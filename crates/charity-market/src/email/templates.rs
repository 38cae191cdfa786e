// HTML and plain-text bodies for transactional email. Every user-supplied
// value passes through `escape_html` before it reaches the HTML part.

use super::domain::{EmailMessage, NotificationCategory};
use crate::listing::{SubmissionRecord, SubmissionStatus};
use crate::payments::OrderRecord;

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Paragraphs are plain text; they are escaped for the HTML part.
fn render(heading: &str, paragraphs: &[String]) -> (String, String) {
    let mut html = format!(
        "<!doctype html><html><body style=\"font-family:sans-serif;color:#1f2937\">\
         <h1 style=\"color:#15803d\">{}</h1>",
        escape_html(heading)
    );
    for paragraph in paragraphs {
        html.push_str("<p>");
        html.push_str(&escape_html(paragraph));
        html.push_str("</p>");
    }
    html.push_str("<p style=\"color:#6b7280\">Charity Market</p></body></html>");

    let mut text = format!("{heading}\n\n");
    text.push_str(&paragraphs.join("\n\n"));
    text.push_str("\n\nCharity Market\n");
    (html, text)
}

fn money(amount: f64, currency: &str) -> String {
    format!("{amount:.2} {}", currency.to_ascii_uppercase())
}

pub fn order_confirmation(order: &OrderRecord, currency: &str) -> EmailMessage {
    let subject = format!("Order confirmed: {}", order.item_title);
    let mut paragraphs = vec![format!("Hi {}, thank you for your order.", order.buyer_name)];
    if order.is_donation {
        paragraphs.push(format!(
            "You claimed \"{}\" from {}. They will be in touch to arrange collection.",
            order.item_title, order.seller_name
        ));
    } else {
        paragraphs.push(format!(
            "You bought \"{}\" from {} for {}.",
            order.item_title,
            order.seller_name,
            money(order.amount, currency)
        ));
        paragraphs.push("Every purchase supports local charities.".to_string());
    }
    paragraphs.push(format!("Order reference: {}", order.id.0));

    let (html, text) = render("Thanks for your order", &paragraphs);
    EmailMessage {
        recipient_id: order.buyer_id.clone(),
        to: order.buyer_email.clone(),
        category: NotificationCategory::OrderUpdates,
        template: "order_confirmation",
        subject,
        html,
        text,
    }
}

pub fn seller_notification(order: &OrderRecord, currency: &str) -> EmailMessage {
    let (heading, template, detail) = if order.is_donation {
        (
            "Your item was claimed",
            "seller_item_claimed",
            format!(
                "{} claimed your donated item \"{}\". Please arrange the hand-over.",
                order.buyer_name, order.item_title
            ),
        )
    } else {
        (
            "Your item sold",
            "seller_item_sold",
            format!(
                "{} bought \"{}\" for {}.",
                order.buyer_name,
                order.item_title,
                money(order.amount, currency)
            ),
        )
    };

    let paragraphs = vec![
        format!("Hi {},", order.seller_name),
        detail,
        format!("Order reference: {}", order.id.0),
    ];
    let (html, text) = render(heading, &paragraphs);
    EmailMessage {
        recipient_id: order.seller_id.clone(),
        to: order.seller_email.clone(),
        category: NotificationCategory::OrderUpdates,
        template,
        subject: format!("{heading}: {}", order.item_title),
        html,
        text,
    }
}

/// Listing status email; the caller supplies the resolved recipient address.
pub fn listing_status(record: &SubmissionRecord, to: &str) -> EmailMessage {
    let (heading, template, mut paragraphs) = match record.status {
        SubmissionStatus::Approved => {
            let mut lines = vec![format!("\"{}\" passed review and is now live.", record.title)];
            if let Some(price) = record.suggested_price {
                lines.push(format!("Suggested price: {price:.2}."));
            }
            ("Your listing is live", "listing_approved", lines)
        }
        SubmissionStatus::Flagged => (
            "Your listing needs a closer look",
            "listing_flagged",
            vec![
                format!(
                    "\"{}\" was held for a manual check by our team.",
                    record.title
                ),
                "We will let you know once it has been reviewed.".to_string(),
            ],
        ),
        SubmissionStatus::Pending => (
            "We received your listing",
            "listing_pending",
            vec![format!(
                "\"{}\" is waiting for review. This usually takes less than a day.",
                record.title
            )],
        ),
    };
    paragraphs.push(format!("Submission reference: {}", record.id.0));

    let (html, text) = render(heading, &paragraphs);
    EmailMessage {
        recipient_id: record.submitter_id.clone(),
        to: to.to_string(),
        category: NotificationCategory::ListingUpdates,
        template,
        subject: format!("{heading}: {}", record.title),
        html,
        text,
    }
}
