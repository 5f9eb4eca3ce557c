//! User-facing text for backend message codes (`auth-s-03`, `address-e-01`, ...).

#[cfg(test)]
#[path = "messages_test.rs"]
mod messages_test;

/// Shown when a code has no translation.
pub const UNKNOWN_CODE_MESSAGE: &str = "No code";

const MESSAGES: &[(&str, &str)] = &[
    ("global-e-02", "Giá trị không hợp lệ"),
    ("auth-s-01", "Yêu cầu đăng ký của bạn đã thành công, hãy kiểm tra email"),
    ("auth-s-02", "Đăng ký thành công"),
    ("auth-s-03", "Đăng nhập thành công"),
    ("auth-s-08", "Yêu cầu thành công, hãy kiểm tra email của bạn 📧"),
    ("auth-s-09", "Lấy lại mật khẩu thành công, chào mừng bại trở lại 👋"),
    ("auth-e-01", "Email đã tồn tại"),
    ("auth-e-02", "Email chưa đăng ký"),
    ("auth-e-04", "Sai mật khẩu"),
    ("auth-e-05", "Mã code không tìm thấy"),
    ("auth-e-07", "Mật khẩu hiện tại không đúng"),
    ("address-s-01", "Tạo địa chỉ mới thành công"),
    ("address-s-04", "Cập nhật địa chỉ thành công"),
    ("address-s-05", "Cập nhật địa chỉ mặc định thành công"),
    ("address-s-06", "Xóa địa chỉ thành công"),
    ("address-e-01", "Không tìm thấy địa chỉ"),
    ("address-e-02", "Không tìm thấy địa chỉ cần cập nhật"),
    ("address-e-03", "Không tìn thấy địa chỉ mặc định"),
    ("address-e-04", "Không thành công, bạn không phải là người tạo ra địa chỉ này"),
];

/// Translation for `code`, or [`UNKNOWN_CODE_MESSAGE`].
pub fn message_for_code(code: &str) -> &'static str {
    MESSAGES.iter().find(|(key, _)| *key == code).map_or_else(
        || {
            log::debug!("no message for api code {code}");
            UNKNOWN_CODE_MESSAGE
        },
        |(_, text)| *text,
    )
}
