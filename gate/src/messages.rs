//! Operator-facing text, as shipped to gate staff (Arabic).

pub const INSTRUCTION_FIRST: &str = "📱 اطلب من المستخدم إظهار رمز التذكرة";
pub const INSTRUCTION_COOLDOWN: &str = "⏳ انتظر تحديث التطبيق ثم اطلب الرمز الجديد";
pub const INSTRUCTION_SECOND: &str = "👉 اطلب من المستخدم إظهار الرمز الجديد (QR Code 2)";
pub const INSTRUCTION_ADMITTED: &str = "✅ تم التحقق بنجاح - يمكن للمستخدم الدخول";

pub const CHECKING_FIRST: &str = "جاري التحقق من الرمز الأول...";
pub const CHECKING_SECOND: &str = "جاري التحقق من الرمز الثاني...";
pub const FIRST_ACCEPTED: &str = "تم التحقق من الرمز الأول!";
pub const FIRST_ACCEPTED_DETAILS: &str = "انتظر تحديث التطبيق...";
pub const READY_FOR_SECOND: &str = "جاهز للمسح الثاني";
pub const READY_FOR_SECOND_DETAILS: &str = "اطلب إظهار الرمز الجديد";
pub const VERIFY_FAILED: &str = "فشل التحقق";
pub const INVALID_CODE: &str = "رمز غير صالح";
pub const CONNECTION_ERROR: &str = "خطأ في الاتصال";
pub const SERVER_HINT: &str = "تأكد من تشغيل الخادم";
pub const FRAUD_ALERT: &str = "احتيال! لقطة شاشة محتملة";
pub const FRAUD_DETAILS: &str = "الرمز لم يتغير - تنبيه الأمن";
pub const ADMITTED: &str = "تم السماح بالدخول!";

pub const ICON_WAITING: &str = "⏳";
pub const ICON_SCAN: &str = "📱";
pub const ICON_SUCCESS: &str = "✅";
pub const ICON_CELEBRATE: &str = "🎉";
pub const ICON_ERROR: &str = "❌";
pub const ICON_FRAUD: &str = "🚨";

/// Admission greeting; falls back to the generic form when the backend sent
/// no holder name.
pub fn greeting(name: Option<&str>) -> String {
    format!("مرحباً {}", name.unwrap_or("بك"))
}
