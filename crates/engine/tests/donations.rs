use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;
use uuid::Uuid;

use engine::{ChargeGateway, Currency, DonationCmd, Engine, EngineError};

fn campaign_engine() -> Engine {
    Engine::builder()
        .campaign("Campaign Profile", "AUD")
        .build()
        .unwrap()
}

fn donation(
    donor: &str,
    amount_minor: i64,
    currency: &str,
    profile_id: Option<Uuid>,
) -> DonationCmd {
    DonationCmd {
        donor_name: donor.to_string(),
        amount_minor,
        currency: currency.to_string(),
        profile_id,
    }
}

struct Decline;

#[async_trait]
impl ChargeGateway for Decline {
    async fn charge(&self, _donation_id: Uuid, _amount_minor: i64, _currency: Currency) -> bool {
        false
    }
}

/// Parks every charge until the test releases it.
struct Hold {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl ChargeGateway for Hold {
    async fn charge(&self, _donation_id: Uuid, _amount_minor: i64, _currency: Currency) -> bool {
        self.entered.notify_one();
        self.release.notified().await;
        true
    }
}

#[tokio::test]
async fn donation_cascades_to_every_ancestor_in_its_currency() {
    let engine = campaign_engine();
    let campaign_id = engine.campaign_profile_id().await.unwrap();

    let chapter = engine
        .create_profile("Europe Chapter", "EUR", None)
        .await
        .unwrap();
    let desk = engine
        .create_profile("US Desk", "USD", Some(chapter.id))
        .await
        .unwrap();
    let bystander = engine
        .create_profile("Sydney Chapter", "AUD", None)
        .await
        .unwrap();

    let donation_id = engine
        .process_donation(donation("Ada", 1000, "AUD", Some(desk.id)))
        .await
        .unwrap();

    // 1000 AUD is 740 USD and 627 EUR at the fixed rates.
    assert_eq!(engine.profile(desk.id).await.unwrap().total, 740);
    assert_eq!(engine.profile(chapter.id).await.unwrap().total, 627);
    assert_eq!(engine.profile(campaign_id).await.unwrap().total, 1000);
    assert_eq!(engine.profile(bystander.id).await.unwrap().total, 0);

    // The record itself stays on the profile the donation was made to; the
    // ancestors only see their totals grow.
    let donations = engine.donations_for_profile(desk.id).await.unwrap();
    assert_eq!(donations.len(), 1);
    assert_eq!(donations[0].id, donation_id);
    assert_eq!(donations[0].amount_minor, 1000);
    assert_eq!(donations[0].currency, Currency::Aud);
    assert!(engine
        .donations_for_profile(chapter.id)
        .await
        .unwrap()
        .is_empty());
    assert!(engine
        .donations_for_profile(campaign_id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn totals_accumulate_across_donations() {
    let engine = campaign_engine();
    let campaign_id = engine.campaign_profile_id().await.unwrap();
    let nick = engine
        .create_profile("Nick's Fundraising Profile", "AUD", None)
        .await
        .unwrap();

    engine
        .process_donation(donation("Nick", 5000, "AUD", Some(nick.id)))
        .await
        .unwrap();
    engine
        .process_donation(donation("Ada", 1000, "AUD", Some(nick.id)))
        .await
        .unwrap();

    assert_eq!(engine.profile(nick.id).await.unwrap().total, 6000);
    assert_eq!(engine.profile(campaign_id).await.unwrap().total, 6000);

    let donations = engine.donations_for_profile(nick.id).await.unwrap();
    assert_eq!(donations.len(), 2);
    assert_eq!(donations[0].donor_name, "Nick");
    assert_eq!(donations[1].donor_name, "Ada");
}

#[tokio::test]
async fn donation_without_profile_goes_to_the_campaign() {
    let engine = campaign_engine();
    let campaign_id = engine.campaign_profile_id().await.unwrap();

    let donation_id = engine
        .process_donation(donation("Ada", 500, "USD", None))
        .await
        .unwrap();

    // 500 USD lands as 675 AUD on the AUD campaign.
    assert_eq!(engine.profile(campaign_id).await.unwrap().total, 675);
    let donations = engine.donations_for_profile(campaign_id).await.unwrap();
    assert_eq!(donations.len(), 1);
    assert_eq!(donations[0].id, donation_id);
    assert_eq!(donations[0].profile_id, campaign_id);
}

#[tokio::test]
async fn declined_charge_saves_nothing() {
    let engine = Engine::builder()
        .campaign("Campaign Profile", "AUD")
        .charge_gateway(Arc::new(Decline))
        .build()
        .unwrap();
    let campaign_id = engine.campaign_profile_id().await.unwrap();
    let nick = engine
        .create_profile("Nick's Fundraising Profile", "AUD", None)
        .await
        .unwrap();

    let err = engine
        .process_donation(donation("Ada", 1000, "AUD", Some(nick.id)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ChargeDeclined);

    assert_eq!(engine.profile(nick.id).await.unwrap().total, 0);
    assert_eq!(engine.profile(campaign_id).await.unwrap().total, 0);
    assert!(engine
        .donations_for_profile(nick.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn rejected_input_leaves_no_trace() {
    let engine = campaign_engine();
    let campaign_id = engine.campaign_profile_id().await.unwrap();

    let err = engine
        .process_donation(donation("  ", 1000, "AUD", None))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("donor name must not be empty".to_string())
    );

    let err = engine
        .process_donation(donation("Ada", 0, "AUD", None))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("amount_minor must be > 0".to_string())
    );

    let err = engine
        .process_donation(donation("Ada", -5, "AUD", None))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("amount_minor must be > 0".to_string())
    );

    let err = engine
        .process_donation(donation("Ada", 1000, "GBP", None))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::UnknownCurrency("GBP. This service only supports USD, EUR, AUD".to_string())
    );

    assert_eq!(engine.profile(campaign_id).await.unwrap().total, 0);
    assert!(engine
        .donations_for_profile(campaign_id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn donation_to_unknown_profile_is_rejected() {
    let engine = campaign_engine();
    let campaign_id = engine.campaign_profile_id().await.unwrap();

    let ghost = Uuid::new_v4();
    let err = engine
        .process_donation(donation("Ada", 1000, "AUD", Some(ghost)))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound(ghost.to_string()));

    assert_eq!(engine.profile(campaign_id).await.unwrap().total, 0);
    assert!(engine
        .donations_for_profile(campaign_id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn campaign_lookup_survives_cache_invalidation() {
    let engine = campaign_engine();

    let before = engine.campaign_profile_id().await.unwrap();
    engine.invalidate_campaign_cache().await;
    let after = engine.campaign_profile_id().await.unwrap();
    assert_eq!(before, after);

    // A campaign donation right after an invalidation still finds the root.
    engine.invalidate_campaign_cache().await;
    engine
        .process_donation(donation("Ada", 1000, "AUD", None))
        .await
        .unwrap();
    assert_eq!(engine.profile(after).await.unwrap().total, 1000);
}

#[tokio::test]
async fn concurrent_donations_lose_no_update() {
    let engine = campaign_engine();
    let campaign_id = engine.campaign_profile_id().await.unwrap();

    let (a, b, c) = tokio::join!(
        engine.process_donation(donation("Ada", 700, "AUD", None)),
        engine.process_donation(donation("Grace", 300, "AUD", None)),
        engine.process_donation(donation("Edsger", 250, "AUD", None)),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    assert_eq!(engine.profile(campaign_id).await.unwrap().total, 1250);
    assert_eq!(
        engine
            .donations_for_profile(campaign_id)
            .await
            .unwrap()
            .len(),
        3
    );
}

#[tokio::test]
async fn in_flight_donation_stays_invisible_until_commit() {
    let gateway = Arc::new(Hold {
        entered: Notify::new(),
        release: Notify::new(),
    });
    let engine = Arc::new(
        Engine::builder()
            .campaign("Campaign Profile", "AUD")
            .charge_gateway(gateway.clone())
            .build()
            .unwrap(),
    );
    let campaign_id = engine.campaign_profile_id().await.unwrap();

    let worker = {
        let engine = engine.clone();
        tokio::spawn(async move {
            engine
                .process_donation(donation("Ada", 1000, "AUD", None))
                .await
        })
    };

    // Parked inside the charge: the transaction is staged but must not show
    // up anywhere yet.
    gateway.entered.notified().await;
    assert_eq!(engine.profile(campaign_id).await.unwrap().total, 0);
    assert!(engine
        .donations_for_profile(campaign_id)
        .await
        .unwrap()
        .is_empty());

    gateway.release.notify_one();
    let donation_id = worker.await.unwrap().unwrap();

    assert_eq!(engine.profile(campaign_id).await.unwrap().total, 1000);
    let donations = engine.donations_for_profile(campaign_id).await.unwrap();
    assert_eq!(donations.len(), 1);
    assert_eq!(donations[0].id, donation_id);
}

#[tokio::test]
async fn new_profile_defaults_its_parent_to_the_campaign() {
    let engine = campaign_engine();
    let campaign_id = engine.campaign_profile_id().await.unwrap();

    let chapter = engine
        .create_profile("Europe Chapter", "EUR", None)
        .await
        .unwrap();
    assert_eq!(chapter.parent_id, Some(campaign_id));

    let desk = engine
        .create_profile("US Desk", "USD", Some(chapter.id))
        .await
        .unwrap();
    assert_eq!(desk.parent_id, Some(chapter.id));

    let listed = engine.profiles().await;
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].id, campaign_id);
}

#[tokio::test]
async fn profile_under_unknown_parent_is_rejected() {
    let engine = campaign_engine();

    let ghost = Uuid::new_v4();
    let err = engine
        .create_profile("Orphan", "AUD", Some(ghost))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound(ghost.to_string()));
    assert_eq!(engine.profiles().await.len(), 1);
}

#[test]
fn engine_requires_a_campaign_profile() {
    let err = Engine::builder().build().unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("a campaign profile is required".to_string())
    );
}
