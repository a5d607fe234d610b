//! Утилиты форматирования чисел для карточек и таблиц

/// Форматирует число с разделителем тысяч (пробел) и указанным количеством знаков после запятой
pub fn format_number_with_decimals(value: f64, decimals: u8) -> String {
    let formatted = match decimals {
        0 => format!("{:.0}", value),
        1 => format!("{:.1}", value),
        2 => format!("{:.2}", value),
        _ => format!("{:.2}", value),
    };

    let parts: Vec<&str> = formatted.split('.').collect();
    let integer_part = parts[0];
    let decimal_part = parts.get(1);

    // Вставляем пробелы каждые 3 цифры с конца целой части
    let mut result = String::new();
    let chars: Vec<char> = integer_part.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 && *c != '-' {
            result.push(' ');
        }
        result.push(*c);
    }
    let formatted_integer = result.chars().rev().collect::<String>();

    match decimal_part {
        Some(d) => format!("{}.{}", formatted_integer, d),
        None => formatted_integer,
    }
}

/// Денежное значение: без копеек, с разделителем тысяч
pub fn format_money(value: f64) -> String {
    format_number_with_decimals(value, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands_separator() {
        assert_eq!(format_number_with_decimals(1234567.891, 2), "1 234 567.89");
        assert_eq!(format_number_with_decimals(-1234.5, 1), "-1 234.5");
        assert_eq!(format_money(300000.0), "300 000");
        assert_eq!(format_money(0.0), "0");
    }
}
