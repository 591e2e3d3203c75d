use super::sendmail::send_email;

/// Delivers the generated password to a freshly provisioned staff account.
/// This is the only place the plaintext password ever leaves the server.
/// The error must stay Send + Sync: handlers hold it across other awaits.
pub async fn send_staff_credentials_email(
    to_email: &str,
    name: &str,
    temp_password: &str,
    login_url: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let subject = "Your staff account is ready";
    let html_body = format!(
        r#"<h2>Welcome, {name}</h2>
<p>An account has been created for you on the agency portal.</p>
<p>Email: <strong>{to_email}</strong><br/>
Temporary password: <strong>{temp_password}</strong></p>
<p>Sign in at <a href="{login_url}">{login_url}</a> and change your password.</p>"#
    );

    send_email(to_email, subject, &html_body).await
}

pub async fn send_agency_welcome_email(
    to_email: &str,
    agency_name: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let subject = "Your agency has been onboarded";
    let html_body = format!(
        r#"<h2>Welcome aboard</h2>
<p>{agency_name} is now active on the portal. Your admin can start inviting
agents and receiving client submissions.</p>"#
    );

    send_email(to_email, subject, &html_body).await
}

pub async fn send_password_reset_email(
    to_email: &str,
    name: &str,
    temp_password: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let subject = "Your password has been reset";
    let html_body = format!(
        r#"<h2>Hello, {name}</h2>
<p>Your password was reset by an administrator.</p>
<p>Temporary password: <strong>{temp_password}</strong></p>
<p>Please sign in and change it immediately.</p>"#
    );

    send_email(to_email, subject, &html_body).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send>(_: T) {}

    // Handlers hold these errors across other awaits, so the futures (and
    // their error type) must stay Send.
    #[test]
    fn test_mail_futures_are_send() {
        assert_send(send_staff_credentials_email(
            "agent@example.com",
            "Agent",
            "temp-pw",
            "https://portal.example.com/login",
        ));
        assert_send(send_agency_welcome_email("admin@example.com", "Acme Realty"));
        assert_send(send_password_reset_email("agent@example.com", "Agent", "temp-pw"));
    }
}
