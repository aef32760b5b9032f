//! HTML body of the notification email.

use crate::config::Branding;
use crate::contact::Sanitized;

/// Renders the notification. Field values must already be sanitized; they
/// are inserted as element content without further escaping.
pub fn render(fields: &Sanitized, branding: &Branding, year: i32) -> String {
    let Sanitized { name, email, subject, message, .. } = fields;
    let Branding { site_name, site_url, app_url } = branding;

    format!(
        r#"<!DOCTYPE html>
<html>
<body style="margin: 0;">
<div style="font-family: Arial, sans-serif; background-color: #f7f7f7; padding: 20px;">
  <table width="100%" cellpadding="0" cellspacing="0" style="max-width: 600px; margin: auto; background-color: #ffffff; border-radius: 8px; overflow: hidden; border: 1px solid #e0e0e0;">
    <tr>
      <td style="background-color: #344467; color: #f2ce00; text-align: center; padding: 20px;">
        <h1 style="margin: 0; font-size: 24px;">New contact</h1>
      </td>
    </tr>
    <tr>
      <td style="padding: 20px; color: #152034;">
        <p style="font-size: 16px;">You received a new message from the website contact form.</p>
        <h3 style="margin-bottom: 5px; color: #f2ce00;">Contact details:</h3>
        <p><strong>Name:</strong> {name}</p>
        <p><strong>Email:</strong> {email}</p>
        <p><strong>Subject:</strong> {subject}</p>
        <hr style="border: none; border-top: 1px solid #e0e0e0; margin: 20px 0;">
        <h3 style="margin-bottom: 5px; color: #f2ce00;">Message:</h3>
        <p style="background: #f0f0f0; padding: 15px; border-radius: 5px; font-size: 15px; color: #152034; white-space: pre-wrap;">{message}</p>
        <p style="font-size: 12px; color: #999999; margin-top: 20px;">Sent via {site_name}</p>
      </td>
    </tr>
    <tr>
      <td style="background-color: #f7f7f7; text-align: center; padding: 15px;">
        <a href="{site_url}" target="_blank">
          <img src="{app_url}/logo.png" alt="{site_name} logo" style="height: 60px; margin-bottom: 10px;">
        </a>
        <p style="font-size: 12px; color: #344467; margin: 0;">&copy; {year} {site_name}. All rights reserved.</p>
      </td>
    </tr>
  </table>
</div>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::sanitize::sanitize;

    fn branding() -> Branding {
        Branding {
            site_name: "KiSite".to_owned(),
            site_url: "https://www.kisite.com.br".to_owned(),
            app_url: "https://relay.example.com".to_owned(),
        }
    }

    fn fields(message: &str) -> Sanitized {
        Sanitized {
            name: sanitize("Ana"),
            email: sanitize("ana@example.com"),
            subject: sanitize("Hi"),
            message: sanitize(message),
            address: "ana@example.com".parse().unwrap(),
        }
    }

    #[test]
    fn places_every_field() {
        let html = render(&fields("Hello"), &branding(), 2026);
        assert!(html.contains("<strong>Name:</strong> Ana</p>"));
        assert!(html.contains("<strong>Email:</strong> ana@example.com</p>"));
        assert!(html.contains("<strong>Subject:</strong> Hi</p>"));
        assert!(html.contains(">Hello</p>"));
        assert!(html.contains("&copy; 2026 KiSite"));
        assert!(html.contains(r#"src="https://relay.example.com/logo.png""#));
    }

    #[test]
    fn injected_markup_is_inert() {
        let message = "<script>alert(1)</script><b onclick=x>hey</b>";
        let html = render(&fields(message), &branding(), 2026);
        assert!(!html.contains("<script"));
        assert!(!html.contains("onclick"));
        assert!(html.contains(">hey</p>"));
    }
}
