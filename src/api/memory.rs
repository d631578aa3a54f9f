use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use serde_json::json;

use super::{ApiError, ResortApi, ScrapeRequest, SkiPassApi, UserApi};
use crate::record::{GeoPoint, OpenTotal, RecordId, Resort, SkiPass, User, UserUpdate};

#[derive(Debug, Default)]
struct MemoryState {
    resorts: Vec<Resort>,
    ski_passes: Vec<SkiPass>,
    users: Vec<User>,
    failures: BTreeMap<RecordId, ApiError>,
    update_log: Vec<RecordId>,
    next_id: u64,
}

impl MemoryState {
    fn fresh_id(&mut self, prefix: &str) -> RecordId {
        self.next_id += 1;
        RecordId::from(format!("{prefix}-{}", self.next_id))
    }

    fn injected(&self, id: &RecordId) -> Result<(), ApiError> {
        match self.failures.get(id) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// A backend that keeps its records in process.
///
/// Backs `--demo` and the tests. Failures can be injected per record id.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    latency: Duration,
}

impl MemoryBackend {
    pub fn new(resorts: Vec<Resort>, ski_passes: Vec<SkiPass>, users: Vec<User>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                resorts,
                ski_passes,
                users,
                ..MemoryState::default()
            }),
            latency: Duration::ZERO,
        }
    }

    /// Sleep this long in every resort update, so in-flight saves are visible.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// A backend seeded with a handful of sample records.
    pub fn demo() -> Self {
        let mut epic = SkiPass {
            pass_type: "Season".to_string(),
            season: "2024-2025".to_string(),
            benefits: vec!["Unlimited access".to_string(), "Buddy tickets".to_string()],
            ..SkiPass::named("pass-epic", "Epic Pass")
        };
        epic.price.adult = Some(982.0);
        let mut ikon = SkiPass {
            pass_type: "Season".to_string(),
            season: "2024-2025".to_string(),
            benefits: vec!["Partner resorts".to_string()],
            ..SkiPass::named("pass-ikon", "Ikon Pass")
        };
        ikon.price.adult = Some(1_249.0);

        let mut zermatt = demo_resort(
            "res-zermatt",
            "Zermatt",
            ("Switzerland", "Valais"),
            (OpenTotal::new(140, 145), OpenTotal::new(50, 52)),
            &[],
            GeoPoint::new(7.7491, 46.0207),
        );
        zermatt.flagged = true;
        zermatt.notes = "Check lift count after the new gondola".to_string();
        zermatt.helicopters = Some(json!({ "heliSkiing": { "operators": 2 } }));

        let resorts = vec![
            demo_resort(
                "res-whistler",
                "Whistler Blackcomb",
                ("Canada", "British Columbia"),
                (OpenTotal::new(180, 200), OpenTotal::new(30, 37)),
                &["pass-epic"],
                GeoPoint::new(-122.9486, 50.1163),
            ),
            demo_resort(
                "res-banff",
                "Banff Sunshine",
                ("Canada", "Alberta"),
                (OpenTotal::new(100, 137), OpenTotal::new(10, 12)),
                &["pass-ikon"],
                GeoPoint::new(-115.7632, 51.1152),
            ),
            demo_resort(
                "res-parkland",
                "Parkland Hill",
                ("Canada", "Alberta"),
                (OpenTotal::new(3, 4), OpenTotal::new(1, 1)),
                &[],
                None,
            ),
            demo_resort(
                "res-parkcity",
                "Park City",
                ("USA", "Utah"),
                (OpenTotal::new(300, 341), OpenTotal::new(38, 41)),
                &["pass-epic"],
                GeoPoint::new(-111.5080, 40.6514),
            ),
            demo_resort(
                "res-alta",
                "Alta",
                ("USA", "Utah"),
                (OpenTotal::new(110, 119), OpenTotal::new(6, 6)),
                &["pass-ikon"],
                GeoPoint::new(-111.6383, 40.5884),
            ),
            zermatt,
        ];
        let users = vec![
            User {
                id: RecordId::from("user-1"),
                username: "admin".to_string(),
                email: "admin@example.test".to_string(),
                created_at: Some("2024-01-15T09:30:00.000Z".to_string()),
            },
            User {
                id: RecordId::from("user-2"),
                username: "patroller".to_string(),
                email: "patrol@example.test".to_string(),
                created_at: None,
            },
        ];
        Self::new(resorts, vec![epic, ikon], users).with_latency(Duration::from_millis(150))
    }

    /// Make every later update or delete of `id` fail with `err`.
    pub fn fail_on(&self, id: &RecordId, err: ApiError) {
        if let Ok(mut state) = self.state.lock() {
            state.failures.insert(id.clone(), err);
        }
    }

    /// Stop failing calls for `id`.
    pub fn heal(&self, id: &RecordId) {
        if let Ok(mut state) = self.state.lock() {
            state.failures.remove(id);
        }
    }

    /// Remove a resort behind the client's back, as another admin would.
    pub fn remove_resort(&self, id: &RecordId) {
        if let Ok(mut state) = self.state.lock() {
            state.resorts.retain(|r| &r.id != id);
        }
    }

    /// Ids passed to `update_resort`, in call order.
    pub fn update_log(&self) -> Vec<RecordId> {
        self.state
            .lock()
            .map(|state| state.update_log.clone())
            .unwrap_or_default()
    }

    /// Current stored resorts.
    pub fn resorts(&self) -> Vec<Resort> {
        self.state
            .lock()
            .map(|state| state.resorts.clone())
            .unwrap_or_default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, ApiError> {
        self.state
            .lock()
            .map_err(|_| ApiError::Transport("in-memory backend state poisoned".to_string()))
    }
}

fn demo_resort(
    id: &str,
    name: &str,
    (country, province): (&str, &str),
    (runs, lifts): (OpenTotal, OpenTotal),
    passes: &[&str],
    location: Option<GeoPoint>,
) -> Resort {
    Resort {
        id: RecordId::from(id),
        country: country.to_string(),
        province: province.to_string(),
        website: format!("https://{}.example.test", id.trim_start_matches("res-")),
        runs,
        lifts,
        ski_passes: passes.iter().map(|p| RecordId::from(*p)).collect(),
        location,
        ..Resort::named(name)
    }
}

impl ResortApi for MemoryBackend {
    fn fetch_resorts(&self) -> Result<Vec<Resort>, ApiError> {
        Ok(self.state()?.resorts.clone())
    }

    fn create_resort(&self, resort: &Resort) -> Result<Resort, ApiError> {
        let mut state = self.state()?;
        let stored = Resort {
            id: state.fresh_id("res"),
            ..resort.clone()
        };
        state.resorts.push(stored.clone());
        Ok(stored)
    }

    fn update_resort(&self, resort: &Resort) -> Result<Resort, ApiError> {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        let mut state = self.state()?;
        state.update_log.push(resort.id.clone());
        state.injected(&resort.id)?;
        let slot = state
            .resorts
            .iter_mut()
            .find(|r| r.id == resort.id)
            .ok_or_else(|| ApiError::NotFound(format!("resort {}", resort.id)))?;
        *slot = resort.clone();
        Ok(resort.clone())
    }

    fn delete_resort(&self, id: &RecordId) -> Result<(), ApiError> {
        let mut state = self.state()?;
        state.injected(id)?;
        let before = state.resorts.len();
        state.resorts.retain(|r| &r.id != id);
        if state.resorts.len() == before {
            return Err(ApiError::NotFound(format!("resort {id}")));
        }
        Ok(())
    }

    fn scrape_and_ingest(&self, request: &ScrapeRequest) -> Result<Resort, ApiError> {
        if request.name.trim().is_empty() || request.url.trim().is_empty() {
            return Err(ApiError::Rejected {
                status: 400,
                message: "Name and URL are required".to_string(),
            });
        }
        let mut state = self.state()?;
        let stored = Resort {
            id: state.fresh_id("res"),
            website: request.url.clone(),
            information: format!("Scraped from {}", request.url),
            ..Resort::named(request.name.clone())
        };
        state.resorts.push(stored.clone());
        Ok(stored)
    }
}

impl SkiPassApi for MemoryBackend {
    fn fetch_ski_passes(&self) -> Result<Vec<SkiPass>, ApiError> {
        Ok(self.state()?.ski_passes.clone())
    }

    fn create_ski_pass(&self, pass: &SkiPass) -> Result<SkiPass, ApiError> {
        if pass.name.trim().is_empty() {
            return Err(ApiError::Rejected {
                status: 400,
                message: "Ski pass name is required".to_string(),
            });
        }
        let mut state = self.state()?;
        let stored = SkiPass {
            id: state.fresh_id("pass"),
            ..pass.clone()
        };
        state.ski_passes.push(stored.clone());
        Ok(stored)
    }

    fn update_ski_pass(&self, pass: &SkiPass) -> Result<SkiPass, ApiError> {
        let mut state = self.state()?;
        state.injected(&pass.id)?;
        let slot = state
            .ski_passes
            .iter_mut()
            .find(|p| p.id == pass.id)
            .ok_or_else(|| ApiError::NotFound(format!("ski pass {}", pass.id)))?;
        *slot = pass.clone();
        Ok(pass.clone())
    }

    fn delete_ski_pass(&self, id: &RecordId) -> Result<(), ApiError> {
        let mut state = self.state()?;
        state.injected(id)?;
        let before = state.ski_passes.len();
        state.ski_passes.retain(|p| &p.id != id);
        if state.ski_passes.len() == before {
            return Err(ApiError::NotFound(format!("ski pass {id}")));
        }
        Ok(())
    }
}

impl UserApi for MemoryBackend {
    fn fetch_users(&self) -> Result<Vec<User>, ApiError> {
        Ok(self.state()?.users.clone())
    }

    fn update_user(&self, id: &RecordId, update: &UserUpdate) -> Result<User, ApiError> {
        let mut state = self.state()?;
        state.injected(id)?;
        let user = state
            .users
            .iter_mut()
            .find(|u| &u.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("user {id}")))?;
        user.username.clone_from(&update.username);
        user.email.clone_from(&update.email);
        Ok(user.clone())
    }

    fn delete_user(&self, id: &RecordId) -> Result<(), ApiError> {
        let mut state = self.state()?;
        state.injected(id)?;
        let before = state.users.len();
        state.users.retain(|u| &u.id != id);
        if state.users.len() == before {
            return Err(ApiError::NotFound(format!("user {id}")));
        }
        Ok(())
    }
}
