pub fn render_password_reset_code(code: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>Password Reset Request</h2>
    <p>You have requested to reset your VoxVid password. Use the verification code below to proceed:</p>
    <div style="border: 2px solid #22D3EE; border-radius: 8px; padding: 30px; text-align: center; margin: 30px 0;">
        <p style="margin: 0; color: #6b7280;">Your verification code is:</p>
        <div style="font-size: 36px; font-weight: bold; letter-spacing: 8px; color: #22D3EE; margin: 20px 0;">{code}</div>
        <p style="margin: 0; color: #9ca3af; font-size: 14px;">This code will expire in 10 minutes</p>
    </div>
    <p style="color: #666; font-size: 14px;">If you didn't request a password reset, you can ignore this email.</p>
</body>
</html>"#
    )
}
