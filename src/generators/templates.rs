//! HTML templates for the printable A4 notice and donation receipt.
//!
//! Rendering is a pure function of the record and the organization profile:
//! nothing here reads the clock, so the same record always renders to the same
//! bytes. Notice content is editor markup and is inserted verbatim; every other
//! field is escaped.

use super::common::{escape_html, escape_or_placeholder, format_inr, pad_receipt_number};
use super::RenderedDocument;
use crate::config::OrganizationProfile;
use crate::models::{Bill, DocumentKind, GeneratedRecord, Notice};

/// Page and frame styles shared by both documents.
const BASE_STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
html, body { width: 210mm; height: 297mm; margin: 0; padding: 0; }
@page { size: A4; margin: 0; }
body { font-family: 'Poppins', 'Noto Serif Bengali', sans-serif; background: white; }
.page-container { width: 210mm; height: 297mm; position: relative; overflow: hidden; }
.border-outer { position: absolute; top: 12px; right: 12px; bottom: 12px; left: 12px; border: 2px solid #1f2937; }
.border-inner { position: absolute; top: 16px; right: 16px; bottom: 16px; left: 16px; border: 1px solid #9ca3af; }
.content-wrapper { height: 100%; display: flex; flex-direction: column; padding: 20mm; }
.header { text-align: center; margin-bottom: 24px; padding-bottom: 16px; border-bottom: 2px solid #1f2937; }
.logo { width: 64px; height: 64px; margin: 0 auto 12px; object-fit: contain; display: block; }
.org-name { font-size: 24px; font-weight: 700; color: #111827; text-transform: uppercase; letter-spacing: 0.1em; margin-bottom: 4px; }
.divider { width: 80px; height: 2px; background: #1f2937; margin: 8px auto; }
.contact-info { font-size: 10px; color: #4b5563; line-height: 1.5; }
.signature-section { margin-top: auto; padding-top: 24px; }
.signatures { display: flex; justify-content: space-between; }
.signature-box { text-align: center; width: 40%; }
.signature-image { height: 48px; margin-bottom: 4px; display: flex; align-items: flex-end; justify-content: center; }
.signature-image img { max-height: 40px; object-fit: contain; }
.signature-line { border-top: 2px solid #1f2937; padding-top: 4px; }
.signature-title { font-size: 10px; font-weight: 700; color: #111827; text-transform: uppercase; letter-spacing: 0.05em; }
.signature-org { font-size: 10px; color: #4b5563; }
.footer { margin-top: 16px; padding-top: 8px; border-top: 1px solid #d1d5db; text-align: center; }
.footer-text { font-size: 10px; color: #6b7280; }
.footer-italic { font-size: 10px; color: #6b7280; font-style: italic; }
"#;

const NOTICE_STYLE: &str = r#"
.notice-title-container { text-align: center; margin-bottom: 16px; }
.notice-title { display: inline-block; font-size: 18px; font-weight: 700; color: #111827; text-transform: uppercase; letter-spacing: 0.2em; padding: 4px 16px; border-bottom: 2px solid #1f2937; }
.notice-meta { display: flex; justify-content: space-between; margin-bottom: 16px; padding-bottom: 8px; font-size: 14px; }
.meta-label { color: #4b5563; }
.meta-value { font-weight: 600; color: #1f2937; }
.notice-content { flex: 1; font-size: 14px; line-height: 1.8; text-align: justify; overflow: hidden; overflow-wrap: break-word; }
.notice-content p { margin-bottom: 12px; }
.notice-content strong, .notice-content b { font-weight: 700; }
.notice-content em, .notice-content i { font-style: italic; }
.notice-content ul { list-style-type: disc; padding-left: 2rem; margin-bottom: 12px; }
.notice-content ol { list-style-type: decimal; padding-left: 2rem; margin-bottom: 12px; }
.notice-content li { margin-bottom: 4px; }
"#;

const RECEIPT_STYLE: &str = r#"
.receipt-title { font-size: 16px; font-weight: 700; color: #111827; text-transform: uppercase; letter-spacing: 0.2em; margin: 8px 0; }
.receipt-number { text-align: right; font-size: 14px; font-weight: 600; margin-bottom: 16px; }
.receipt-number span { color: #4b5563; }
.receipt-body { flex: 1; }
.receipt-table { border: 2px solid #1f2937; padding: 24px; margin-bottom: 24px; }
.receipt-row { display: flex; justify-content: space-between; padding: 8px 0; border-bottom: 1px solid #e5e7eb; font-size: 14px; }
.receipt-label { font-weight: 600; color: #374151; width: 40%; }
.receipt-value { color: #1f2937; width: 55%; text-align: right; overflow-wrap: anywhere; }
.amount-row { margin-top: 8px; padding-top: 12px; border-top: 2px solid #1f2937; border-bottom: none; }
.amount-row .receipt-label { font-weight: 700; text-transform: uppercase; }
.amount-row .receipt-value { font-size: 18px; font-weight: 700; }
.thank-you { font-size: 14px; font-weight: 500; color: #374151; text-align: center; }
"#;

/// Renders records into self-contained A4 HTML pages.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    organization: OrganizationProfile,
}

impl TemplateRenderer {
    pub fn new(organization: OrganizationProfile) -> Self {
        Self { organization }
    }

    pub fn organization(&self) -> &OrganizationProfile {
        &self.organization
    }

    pub fn render(&self, record: &GeneratedRecord) -> RenderedDocument {
        match record {
            GeneratedRecord::Notice(notice) => self.render_notice(notice),
            GeneratedRecord::Bill(bill) => self.render_bill(bill),
        }
    }

    pub fn render_notice(&self, notice: &Notice) -> RenderedDocument {
        let org = escape_html(&self.organization.name);
        let body = format!(
            r#"<div class="page-container">
  <div class="border-outer"></div>
  <div class="border-inner"></div>
  <div class="content-wrapper">
{header}
    <div class="notice-title-container"><div class="notice-title">NOTICE</div></div>
    <div class="notice-meta">
      <div><span class="meta-label">Ref No:</span> <span class="meta-value">{number}</span></div>
      <div><span class="meta-label">Date:</span> <span class="meta-value">{date}</span></div>
    </div>
    <div class="notice-content">
{content}
    </div>
    <div class="signature-section">
{signatures}
      <div class="footer">
        <div class="footer-text">{org} &bull; {address}</div>
      </div>
    </div>
  </div>
</div>"#,
            header = self.header(None),
            number = escape_or_placeholder(&notice.notice_number),
            date = escape_or_placeholder(&notice.date),
            content = notice.content,
            signatures = self.signatures(),
            org = org,
            address = escape_html(&self.organization.address),
        );

        RenderedDocument {
            kind: DocumentKind::Notice,
            html: page(&format!("Notice {}", notice.notice_number), NOTICE_STYLE, &body),
        }
    }

    pub fn render_bill(&self, bill: &Bill) -> RenderedDocument {
        let org = escape_html(&self.organization.name);
        let receipt_no = if bill.receipt_number.trim().is_empty() {
            "XXXXXX".to_string()
        } else {
            escape_html(&pad_receipt_number(&bill.receipt_number))
        };

        let body = format!(
            r#"<div class="page-container">
  <div class="border-outer"></div>
  <div class="border-inner"></div>
  <div class="content-wrapper">
{header}
    <div class="receipt-number"><span>Receipt No:</span> {receipt_no}</div>
    <div class="receipt-body">
      <div class="receipt-table">
        <div class="receipt-row"><div class="receipt-label">Received From:</div><div class="receipt-value">{name}</div></div>
        <div class="receipt-row"><div class="receipt-label">Date:</div><div class="receipt-value">{date}</div></div>
        <div class="receipt-row"><div class="receipt-label">Received By:</div><div class="receipt-value">{received_by}</div></div>
        <div class="receipt-row amount-row"><div class="receipt-label">Amount Received:</div><div class="receipt-value">&#8377; {amount}</div></div>
      </div>
      <div class="thank-you">Thank you for your generous contribution!</div>
    </div>
    <div class="signature-section">
{signatures}
      <div class="footer">
        <div class="footer-text">{org} &bull; {address} &bull; {contact}</div>
        <div class="footer-italic">This is an official receipt.</div>
      </div>
    </div>
  </div>
</div>"#,
            header = self.header(Some("DONATION RECEIPT")),
            receipt_no = receipt_no,
            name = escape_or_placeholder(&bill.name),
            date = escape_or_placeholder(&bill.date),
            received_by = escape_or_placeholder(&bill.received_by),
            amount = format_inr(bill.amount),
            signatures = self.signatures(),
            org = org,
            address = escape_html(&self.organization.address),
            contact = escape_html(&self.organization.contact),
        );

        RenderedDocument {
            kind: DocumentKind::Bill,
            html: page(
                &format!("Receipt {}", pad_receipt_number(&bill.receipt_number)),
                RECEIPT_STYLE,
                &body,
            ),
        }
    }

    fn asset_url(&self, path: &str) -> String {
        escape_html(&format!("{}/{}", self.organization.asset_base_url, path))
    }

    fn header(&self, subtitle: Option<&str>) -> String {
        let org = escape_html(&self.organization.name);
        let subtitle = subtitle
            .map(|s| format!("\n      <div class=\"receipt-title\">{s}</div>"))
            .unwrap_or_default();

        format!(
            r#"    <div class="header">
      <img src="{logo}" alt="{org}" class="logo" />
      <div class="org-name">{org}</div>
      <div class="divider"></div>{subtitle}
      <div class="contact-info">
        {address}<br/>
        Phone: {contact} | Email: {email}
      </div>
    </div>"#,
            logo = self.asset_url("logo.webp"),
            org = org,
            subtitle = subtitle,
            address = escape_html(&self.organization.address),
            contact = escape_html(&self.organization.contact),
            email = escape_html(&self.organization.email),
        )
    }

    fn signatures(&self) -> String {
        let org = escape_html(&self.organization.name);
        [("President", "president"), ("Secretary", "secretary")]
            .iter()
            .map(|(title, file)| {
                format!(
                    r#"        <div class="signature-box">
          <div class="signature-image"><img src="{src}" alt="{title} Signature" /></div>
          <div class="signature-line">
            <div class="signature-title">{title}</div>
            <div class="signature-org">{org}</div>
          </div>
        </div>"#,
                    src = self.asset_url(&format!("signatures/{file}.webp")),
                    title = title,
                    org = org,
                )
            })
            .fold(
                String::from("      <div class=\"signatures\">\n"),
                |mut acc, box_html| {
                    acc.push_str(&box_html);
                    acc.push('\n');
                    acc
                },
            )
            + "      </div>"
    }
}

fn page(title: &str, style: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>{title}</title>
<style>{base}{style}</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape_html(title),
        base = BASE_STYLE,
        style = style,
        body = body,
    )
}
