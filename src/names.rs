//! Vietnamese names for lunar days, months and years.

const STEMS: [&str; 10] = [
    "Giáp", "Ất", "Bính", "Đinh", "Mậu", "Kỷ", "Canh", "Tân", "Nhâm", "Quý",
];

const BRANCHES: [&str; 12] = [
    "Tý", "Sửu", "Dần", "Mão", "Thìn", "Tỵ", "Ngọ", "Mùi", "Thân", "Dậu", "Tuất", "Hợi",
];

const MONTHS: [&str; 12] = [
    "Giêng", "Hai", "Ba", "Tư", "Năm", "Sáu", "Bảy", "Tám", "Chín", "Mười", "Mười Một", "Chạp",
];

pub fn month_name(month: u32) -> String {
    match month.checked_sub(1).and_then(|idx| MONTHS.get(idx as usize)) {
        Some(name) => format!("Tháng {name}"),
        None => format!("Tháng {month}"),
    }
}

pub fn day_name(day: u32) -> String {
    if (1..=10).contains(&day) {
        format!("Mùng {day}")
    } else {
        day.to_string()
    }
}

/// Stem-branch name of a lunar year, e.g. 2024 is "Năm Giáp Thìn".
pub fn year_name(year: i32) -> String {
    let year = i64::from(year);
    let stem = STEMS[(year + 6).rem_euclid(10) as usize];
    let branch = BRANCHES[(year + 8).rem_euclid(12) as usize];
    format!("Năm {stem} {branch}")
}

/// Translates a Chinese earthly branch character, leaving unknown input as is.
pub fn branch(chinese: &str) -> String {
    let idx = match chinese {
        "子" => 0,
        "丑" => 1,
        "寅" => 2,
        "卯" => 3,
        "辰" => 4,
        "巳" => 5,
        "午" => 6,
        "未" => 7,
        "申" => 8,
        "酉" => 9,
        "戌" => 10,
        "亥" => 11,
        other => return other.to_string(),
    };
    BRANCHES[idx].to_string()
}
