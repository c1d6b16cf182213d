#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use roster_core::{Personal, PersonalInfo, PlayerStats, Position, Specialization};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn timestamp(text: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").unwrap()
}

pub fn info(first_name: &str, last_name: &str, salary: f64) -> PersonalInfo {
    PersonalInfo {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        birth_date: date(1985, 4, 12),
        hire_date: date(2019, 7, 1),
        salary,
        origin_country: "España".to_string(),
    }
}

pub fn coach(id: i64, first_name: &str, specialization: Specialization) -> Personal {
    let mut coach = Personal::coach(info(first_name, "García", 75_000.0), specialization);
    coach.id = id;
    coach.created_at = timestamp("2024-03-01T09:15:00");
    coach.updated_at = timestamp("2024-03-02T18:40:30.125");
    coach
}

pub fn player(id: i64, first_name: &str, position: Position, shirt_number: u32) -> Personal {
    let mut player = Personal::player(
        info(first_name, "Fernández", 42_500.75),
        PlayerStats {
            position,
            shirt_number,
            height: 1.83,
            weight: 77.4,
            goals: 17,
            matches_played: 96,
        },
    );
    player.id = id;
    player.created_at = timestamp("2024-03-01T09:15:00");
    player.updated_at = timestamp("2024-03-01T09:15:00");
    player
}

/// Mixed roster in deliberately non-sorted id order.
pub fn roster() -> Vec<Personal> {
    vec![
        player(7, "Marta", Position::Forward, 10),
        coach(2, "Jorge", Specialization::HeadCoach),
        player(4, "Irene", Position::Goalkeeper, 1),
        coach(9, "Lucía", Specialization::GoalkeeperCoach),
        player(3, "Álvaro & Co", Position::Defender, 5),
    ]
}
