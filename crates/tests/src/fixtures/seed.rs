use bson::oid::ObjectId;
use hireflow_client::GatewayClient;
use serde_json::{Value, json};

use super::test_app::TestApp;

/// A tenant identity with a signed token for gateway access.
pub struct SeededTenant {
    pub tenant_id: ObjectId,
    pub user_id: ObjectId,
    pub token: String,
}

impl TestApp {
    /// Mint a fresh tenant identity. Tenants exist implicitly as a data
    /// partition; no registration round trip is needed.
    pub fn seed_tenant(&self, name: &str) -> SeededTenant {
        let tenant_id = ObjectId::new();
        let user_id = ObjectId::new();
        let token = self
            .auth
            .generate_token(
                user_id,
                name,
                &format!("{}@example.test", name),
                Some(tenant_id),
            )
            .expect("Failed to mint token");
        SeededTenant {
            tenant_id,
            user_id,
            token,
        }
    }

    /// Connect a gateway client for the given tenant identity.
    pub async fn connect(&self, tenant: &SeededTenant) -> GatewayClient {
        GatewayClient::connect(&self.addr.to_string(), &tenant.token)
            .await
            .expect("WS connect failed")
    }
}

pub fn job_payload(title: &str, status: &str, min_salary: f64) -> Value {
    json!({
        "title": title,
        "category": "Software",
        "type": "Full Time",
        "description": "Build things",
        "skills": ["rust", "mongodb"],
        "location": { "country": "US", "state": "CA", "city": "San Francisco" },
        "salary_range": { "min": min_salary, "max": min_salary + 40_000.0 },
        "status": status,
    })
}

pub fn candidate_payload(first: &str, last: &str, status: &str) -> Value {
    json!({
        "personal_info": {
            "first_name": first,
            "last_name": last,
            "email": format!("{}.{}@example.test", first.to_lowercase(), last.to_lowercase()),
            "phone": "+1 555 0100",
        },
        "professional_info": {
            "current_role": "Software Engineer",
            "experience_years": 4.0,
            "skills": ["rust", "sql"],
        },
        "application_info": {
            "applied_role": "Backend Engineer",
            "applied_date": "2026-08-01",
            "recruiter_name": "Sam Recruiter",
            "source": "LinkedIn",
        },
        "status": status,
    })
}

pub fn deal_payload(name: &str, value: f64, status: &str) -> Value {
    json!({
        "name": name,
        "stage": "Negotiation",
        "status": status,
        "deal_value": value,
        "probability": 60,
        "owner": { "name": "Dana Owner" },
        "contact": { "email": "contact@example.test", "phone": "+1 555 0101" },
    })
}

pub fn ticket_payload(title: &str, priority: &str) -> Value {
    json!({
        "title": title,
        "category": "Bug",
        "description": "Something is off",
        "priority": priority,
    })
}
