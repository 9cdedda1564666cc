use serde::Serialize;

use super::NotificationPayload;
use crate::generators::common::{escape_html, format_inr, pad_receipt_number};
use crate::models::GeneratedRecord;

/// A composed notification email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Build the email describing a generation event.
pub fn compose(payload: &NotificationPayload, from: &str, to: &str) -> EmailMessage {
    let (subject, html) = match payload {
        GeneratedRecord::Notice(notice) => (
            format!("Notice Generated - {}", notice.notice_number),
            format!(
                "<h2>Notice Generated</h2>\n\
                 <p><strong>Notice Number:</strong> {}</p>\n\
                 <p><strong>Date:</strong> {}</p>\n\
                 <p><strong>Generated At:</strong> {}</p>\n\
                 <hr>\n<h3>Content:</h3>\n{}",
                escape_html(&notice.notice_number),
                escape_html(&notice.date),
                notice.created_at.format("%d/%m/%Y, %H:%M:%S UTC"),
                notice.content,
            ),
        ),
        GeneratedRecord::Bill(bill) => {
            let receipt_no = pad_receipt_number(&bill.receipt_number);
            (
                format!("Donation Receipt Generated - {}", receipt_no),
                format!(
                    "<h2>Donation Receipt Generated</h2>\n\
                     <p><strong>Receipt Number:</strong> {}</p>\n\
                     <p><strong>Donor Name:</strong> {}</p>\n\
                     <p><strong>Amount:</strong> &#8377;{}</p>\n\
                     <p><strong>Received By:</strong> {}</p>\n\
                     <p><strong>Date:</strong> {}</p>\n\
                     <p><strong>Generated At:</strong> {}</p>",
                    receipt_no,
                    escape_html(&bill.name),
                    format_inr(bill.amount),
                    escape_html(&bill.received_by),
                    escape_html(&bill.date),
                    bill.created_at.format("%d/%m/%Y, %H:%M:%S UTC"),
                ),
            )
        }
    };

    EmailMessage {
        from: from.to_string(),
        to: to.to_string(),
        subject,
        html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Bill;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_bill_email() {
        let payload = GeneratedRecord::Bill(Bill {
            id: "bill_1".to_string(),
            receipt_number: "7".to_string(),
            name: "A. Rahman".to_string(),
            amount: 5000.0,
            received_by: "Treasurer".to_string(),
            date: "01.01.2026".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 10, 15, 0).unwrap(),
        });

        let message = compose(&payload, "office@example.org", "alerts@example.org");
        assert_eq!(message.subject, "Donation Receipt Generated - 000007");
        assert_eq!(message.to, "alerts@example.org");
        assert!(message.html.contains("&#8377;5,000"));
        assert!(message.html.contains("01/01/2026, 10:15:00 UTC"));
    }
}
