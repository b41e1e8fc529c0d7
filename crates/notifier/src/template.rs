//! Message bodies for each channel.

/// Render a payload value as message text.
///
/// Strings are used verbatim; any other JSON value uses its compact form.
pub fn payload_text(payload: &serde_json::Value) -> String {
    match payload {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// HTML body of the monthly notification email.
pub fn email_html(display_name: &str, payload: &serde_json::Value) -> String {
    let name = escape_html(display_name);
    let data = escape_html(&payload_text(payload));

    format!(
        r#"<html>
  <head>
    <style>
      body {{ font-family: Arial, sans-serif; line-height: 1.6; }}
      .container {{ padding: 20px; max-width: 600px; margin: 0 auto; }}
      .header {{ background-color: #f5f5f5; padding: 10px; border-radius: 5px; }}
      .content {{ padding: 20px 0; }}
      .payload {{ background-color: #f9f9f9; padding: 15px; border: 3px solid #007bff; margin: 15px 0; }}
      .footer {{ font-size: 12px; color: #666; margin-top: 20px; }}
    </style>
  </head>
  <body>
    <div class="container">
      <div class="header"><h2>Monthly Notification</h2></div>
      <div class="content">
        <h4>Dear {name},</h4>
        <h4>Your monthly statement</h4>
        <p>Last month settled:</p>
        <div class="payload">{data}</div>
        <p>Best regards.</p>
      </div>
      <div class="footer">
        <p>This is an automated message, please do not reply.</p>
      </div>
    </div>
  </body>
</html>
"#
    )
}

/// Plain-text body of the monthly WhatsApp message (WhatsApp markup).
pub fn chat_text(display_name: &str, payload: &serde_json::Value) -> String {
    format!(
        "*Monthly Notification*\n\nDear {},\n\nHere is your personalized monthly notification:\n\n_{}_\n\nThank you for your attention.",
        display_name,
        payload_text(payload)
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
