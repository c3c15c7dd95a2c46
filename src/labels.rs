//! Display strings for the kiosk. Domain types never carry these; they are
//! resolved here when something is about to be shown.

use crate::errors::{AppError, ErrorKind};
use crate::models::SubscriptionStatus;

pub const LOOKUP_MISS: &str = "لم يتم العثور على موظف بهذا الرمز";
pub const INVALID_RFID: &str = "رمز البطاقة غير صالح";
pub const SESSION_EXPIRED: &str = "انتهت صلاحية الجلسة، يرجى تسجيل الدخول مجددًا";
pub const NETWORK_FAILURE: &str = "تعذر الاتصال بالخادم، حاول مرة أخرى";
pub const UNEXPECTED: &str = "حدث خطأ غير متوقع";
pub const STILL_PRESENT: &str = "لا يزال في الدوام";
pub const UNAVAILABLE: &str = "غير متوفر";

pub const EXPORT_HEADERS: [&str; 5] = [
    "اسم الموظف",
    "النادي",
    "وقت الدخول",
    "وقت الخروج",
    "عدد الساعات",
];

pub fn error_message(err: &AppError) -> String {
    match err.kind {
        ErrorKind::Validation => INVALID_RFID.to_string(),
        ErrorKind::LookupMiss => LOOKUP_MISS.to_string(),
        ErrorKind::Rejected => err.message.clone(),
        ErrorKind::Auth => SESSION_EXPIRED.to_string(),
        ErrorKind::Network => NETWORK_FAILURE.to_string(),
        ErrorKind::Internal => UNEXPECTED.to_string(),
    }
}

pub fn subscription_status(status: SubscriptionStatus) -> &'static str {
    match status {
        SubscriptionStatus::Active => "نشط",
        SubscriptionStatus::Expired => "منتهي",
        SubscriptionStatus::Upcoming => "لم يبدأ بعد",
        SubscriptionStatus::Frozen => "مجمد",
        SubscriptionStatus::Cancelled => "ملغي",
        SubscriptionStatus::Remaining => "متبقي",
        SubscriptionStatus::NearingExpiry => "قارب على الانتهاء",
    }
}
