//! User-facing strings. The journal is a Korean-language product.

pub const INVALID_CREDENTIALS: &str = "아이디 또는 비밀번호가 올바르지 않습니다.";
pub const LOGIN_REQUEST_FAILED: &str = "로그인 중 오류가 발생했습니다.";
pub const LOGIN_THROTTLED: &str = "로그인 시도가 너무 많습니다. 잠시 후 다시 시도해주세요.";
pub const SAVE_FAILED: &str = "응답 저장 중 오류가 발생했습니다.";
pub const SAVE_SUCCEEDED: &str = "응답이 성공적으로 저장되었습니다!";
pub const LOAD_RESPONSES_FAILED: &str = "응답을 불러오는데 실패했습니다.";
pub const LOAD_QUESTIONS_FAILED: &str = "질문을 불러오는데 실패했습니다.";
pub const LOAD_CONFIG_FAILED: &str = "설정을 불러오는데 실패했습니다.";
pub const SCORES_REQUIRED: &str = "점수 데이터가 필요합니다.";
pub const SCORE_OUT_OF_RANGE: &str = "점수는 1점에서 5점 사이여야 합니다.";
pub const USER_ID_REQUIRED: &str = "사용자 아이디가 필요합니다.";
pub const DATE_REQUIRED: &str = "날짜가 필요합니다.";
pub const MALFORMED_REQUEST: &str = "요청 형식이 올바르지 않습니다.";
pub const INCOMPLETE_SCORES: &str = "모든 항목에 점수를 입력해주세요.";
pub const NOT_LOGGED_IN: &str = "로그인이 필요합니다.";

pub fn welcome(name: &str) -> String {
    format!("환영합니다, {name}님!")
}
