//! Sample accounts for local development, loaded with `timerent seed`.

use anyhow::Context;
use sqlx::PgPool;
use tracing::info;

use crate::{
    auth::password::hash_password,
    users::{
        self,
        repo_types::{ProfileChanges, Role},
    },
};

pub const SAMPLE_PASSWORD: &str = "password123";

#[derive(Debug)]
pub struct SampleLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub city: &'static str,
    pub state: &'static str,
    pub max_distance_km: f64,
}

/// Whole rupees.
#[derive(Debug)]
pub struct SampleWallet {
    pub balance: i64,
    pub total_earned: i64,
    pub total_withdrawn: i64,
}

#[derive(Debug)]
pub struct SampleGiver {
    pub emotional_tempo: &'static str,
    pub silence_comfort: i32,
    pub energy_level: &'static str,
    pub voice_tone_preference: &'static str,
    pub hourly_rate: i64,
    pub presence_rating: f64,
    pub total_sessions: i32,
    pub location: SampleLocation,
    pub wallet: SampleWallet,
}

#[derive(Debug)]
pub struct SampleUser {
    pub email: &'static str,
    pub name: &'static str,
    pub role: Role,
    pub bio: &'static str,
    pub giver: Option<SampleGiver>,
}

pub const SAMPLE_USERS: &[SampleUser] = &[
    SampleUser {
        email: "sarah@example.com",
        name: "Sarah Chen",
        role: Role::TimeGiver,
        bio: "Calm presence for those who need to think. I specialize in silent companionship.",
        giver: Some(SampleGiver {
            emotional_tempo: "slow",
            silence_comfort: 9,
            energy_level: "calm",
            voice_tone_preference: "medium",
            hourly_rate: 399,
            presence_rating: 4.8,
            total_sessions: 42,
            location: SampleLocation {
                latitude: 19.0760,
                longitude: 72.8777,
                city: "Mumbai",
                state: "Maharashtra",
                max_distance_km: 25.0,
            },
            wallet: SampleWallet {
                balance: 12_568,
                total_earned: 15_679,
                total_withdrawn: 3_111,
            },
        }),
    },
    SampleUser {
        email: "michael@example.com",
        name: "Michael Rodriguez",
        role: Role::TimeGiver,
        bio: "Here to sit with you while you process your thoughts. No judgment, just presence.",
        giver: Some(SampleGiver {
            emotional_tempo: "slow",
            silence_comfort: 8,
            energy_level: "calm",
            voice_tone_preference: "deep",
            hourly_rate: 349,
            presence_rating: 4.6,
            total_sessions: 28,
            location: SampleLocation {
                latitude: 28.6139,
                longitude: 77.2090,
                city: "Delhi",
                state: "Delhi",
                max_distance_km: 30.0,
            },
            wallet: SampleWallet {
                balance: 8_234,
                total_earned: 9_722,
                total_withdrawn: 1_488,
            },
        }),
    },
    SampleUser {
        email: "priya@example.com",
        name: "Priya Sharma",
        role: Role::TimeGiver,
        bio: "Quiet companion for your thinking time. Sometimes we just need someone to be there.",
        giver: Some(SampleGiver {
            emotional_tempo: "slow",
            silence_comfort: 10,
            energy_level: "calm",
            voice_tone_preference: "medium",
            hourly_rate: 299,
            presence_rating: 4.9,
            total_sessions: 15,
            location: SampleLocation {
                latitude: 12.9716,
                longitude: 77.5946,
                city: "Bangalore",
                state: "Karnataka",
                max_distance_km: 20.0,
            },
            wallet: SampleWallet {
                balance: 4_485,
                total_earned: 4_485,
                total_withdrawn: 0,
            },
        }),
    },
    SampleUser {
        email: "alex@example.com",
        name: "Alex Johnson",
        role: Role::TimeSeeker,
        bio: "Founder looking for presence while making important decisions",
        giver: None,
    },
    SampleUser {
        email: "jordan@example.com",
        name: "Jordan Lee",
        role: Role::TimeSeeker,
        bio: "Sometimes I just need someone to sit with me while I think",
        giver: None,
    },
];

impl SampleUser {
    pub fn profile(&self) -> ProfileChanges {
        let mut changes = ProfileChanges {
            bio: Some(self.bio.to_string()),
            ..Default::default()
        };
        if let Some(g) = &self.giver {
            changes.emotional_tempo = Some(g.emotional_tempo.to_string());
            changes.silence_comfort = Some(g.silence_comfort);
            changes.energy_level = Some(g.energy_level.to_string());
            changes.voice_tone_preference = Some(g.voice_tone_preference.to_string());
            changes.is_available = Some(true);
            changes.latitude = Some(g.location.latitude);
            changes.longitude = Some(g.location.longitude);
            changes.city = Some(g.location.city.to_string());
            changes.state = Some(g.location.state.to_string());
            changes.country = Some("India".to_string());
            changes.is_location_public = Some(true);
            changes.max_distance_km = Some(g.location.max_distance_km);
        }
        changes
    }
}

/// Inserts every sample account that does not exist yet. Returns how many were created.
pub async fn run(db: &PgPool) -> anyhow::Result<usize> {
    let password_hash = hash_password(SAMPLE_PASSWORD)?;
    let mut created = 0;

    for sample in SAMPLE_USERS {
        if users::repo::find_by_email(db, sample.email).await?.is_some() {
            info!(email = sample.email, "sample user exists, skipping");
            continue;
        }

        let user = users::repo::create(
            db,
            sample.email,
            &password_hash,
            Some(sample.name),
            sample.role,
            sample.giver.as_ref().map(|g| g.hourly_rate),
        )
        .await?;
        users::repo::update_profile(db, user.id, &sample.profile()).await?;

        if let Some(g) = &sample.giver {
            sqlx::query(
                "UPDATE users SET presence_rating = $2, total_sessions = $3 WHERE id = $1",
            )
            .bind(user.id)
            .bind(g.presence_rating)
            .bind(g.total_sessions)
            .execute(db)
            .await
            .context("seed giver stats")?;

            sqlx::query(
                r#"
                INSERT INTO wallets (user_id, balance, total_earned, total_withdrawn)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (user_id) DO NOTHING
                "#,
            )
            .bind(user.id)
            .bind(g.wallet.balance)
            .bind(g.wallet.total_earned)
            .bind(g.wallet.total_withdrawn)
            .execute(db)
            .await
            .context("seed wallet")?;
        }

        info!(email = sample.email, role = sample.role.as_str(), "sample user created");
        created += 1;
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn sample_profiles_are_valid() {
        for sample in SAMPLE_USERS {
            assert_eq!(sample.profile().validate(), Ok(()), "{}", sample.email);
        }
    }

    #[test]
    fn sample_emails_are_unique() {
        let emails: HashSet<_> = SAMPLE_USERS.iter().map(|s| s.email).collect();
        assert_eq!(emails.len(), SAMPLE_USERS.len());
    }

    #[test]
    fn givers_carry_giver_roles_and_balanced_wallets() {
        let givers: Vec<_> = SAMPLE_USERS.iter().filter(|s| s.giver.is_some()).collect();
        assert_eq!(givers.len(), 3);
        for sample in givers {
            assert!(sample.role.is_giver(), "{}", sample.email);
            let Some(g) = &sample.giver else { continue };
            assert_eq!(
                g.wallet.balance,
                g.wallet.total_earned - g.wallet.total_withdrawn,
                "{}",
                sample.email
            );
            assert!((0.0..=5.0).contains(&g.presence_rating));
        }
    }

    #[test]
    fn seekers_have_no_giver_profile() {
        for sample in SAMPLE_USERS.iter().filter(|s| s.role == Role::TimeSeeker) {
            assert!(sample.giver.is_none(), "{}", sample.email);
            assert!(sample.profile().latitude.is_none());
        }
    }
}
