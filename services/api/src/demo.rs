use crate::infra::{InMemoryNotificationRepository, InMemorySubmissionRepository, OfflinePricing};
use charity_market::config::{AppConfig, ModerationConfig};
use charity_market::error::AppError;
use charity_market::listing::{
    next_step, ModerationOutcome, ModerationVerdict, NotificationAudience, SubmissionDraft,
    SubmissionId, SubmissionModerationService, SubmissionRecord, WizardStep,
    DEFAULT_FALLBACK_PRICE,
};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ModerateArgs {
    /// Listing title
    #[arg(long)]
    pub(crate) title: String,
    /// Listing description
    #[arg(long, default_value = "")]
    pub(crate) description: String,
    /// Category name
    #[arg(long, default_value = "")]
    pub(crate) category: String,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Answer "donate" at the submission-type step instead of selling.
    #[arg(long)]
    pub(crate) donate: bool,
    /// Price used when the offline pricing assistant has no answer.
    #[arg(long)]
    pub(crate) fallback_price: Option<f64>,
}

/// Falls back to the built-in moderation settings when the environment is incomplete.
fn moderation_config() -> ModerationConfig {
    match AppConfig::load() {
        Ok(config) => config.moderation,
        Err(err) => {
            eprintln!("using built-in moderation settings ({err})");
            ModerationConfig {
                denylist_override: None,
                fallback_price: DEFAULT_FALLBACK_PRICE,
            }
        }
    }
}

pub(crate) fn run_moderate(args: ModerateArgs) -> Result<(), AppError> {
    let gate = crate::server::moderation_gate(&moderation_config());
    let verdict = gate.screen(&args.title, &args.description, &args.category);
    println!("{}", render_verdict(&verdict));
    Ok(())
}

fn render_verdict(verdict: &ModerationVerdict) -> String {
    serde_json::to_string_pretty(verdict).unwrap_or_else(|err| format!("{{\"error\": \"{err}\"}}"))
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        donate,
        fallback_price,
    } = args;
    let moderation = moderation_config();
    let fallback_price = fallback_price.unwrap_or(moderation.fallback_price);

    println!("Charity market demo");
    println!("\nListing wizard");
    let answers = [
        "Hi, I'd like to list something",
        "Toys",
        "Wooden train set",
        "Like new",
        if donate {
            "I'd like to donate it"
        } else {
            "I'll sell it"
        },
        "15",
        "Forty pieces, all tracks included",
        "Photos uploaded",
        "Looks good",
    ];
    let mut step = WizardStep::Start;
    for answer in answers {
        if step.is_terminal() {
            break;
        }
        let next = next_step(step, answer);
        println!("  {:<16} {:<40} -> {}", step.as_str(), answer, next);
        step = next;
    }

    let submissions = Arc::new(InMemorySubmissionRepository::default());
    let notifications = Arc::new(InMemoryNotificationRepository::default());
    let service = SubmissionModerationService::new(
        Arc::new(crate::server::moderation_gate(&moderation)),
        Arc::new(OfflinePricing),
        submissions.clone(),
        notifications.clone(),
    )
    .with_fallback_price(fallback_price);

    let drafts = [
        sample_draft("demo-1", "Wooden train set", "Forty pieces, all tracks included", "Toys", Some(15.0)),
        sample_draft("demo-2", "Replica football shirt", "Worn twice", "Clothing", None),
    ];

    println!("\nModeration");
    for draft in drafts {
        submissions.seed(SubmissionRecord::pending(
            draft.submission_id.0.clone(),
            "demo-user",
            draft.title.clone(),
        ));
        let title = draft.title.clone();
        match service.moderate(draft).await? {
            ModerationOutcome::Approved {
                suggested_price,
                pricing_confidence,
                ..
            } => println!(
                "  {title}: approved at {suggested_price:.2} ({pricing_confidence:?} confidence)"
            ),
            ModerationOutcome::Rejected { reason, .. } => {
                println!("  {title}: held for review. {reason}")
            }
        }
    }

    println!("\nNotifications");
    for notification in notifications.events() {
        let audience = match &notification.audience {
            NotificationAudience::Admins => "admins".to_string(),
            NotificationAudience::User(id) => format!("user {id}"),
        };
        println!(
            "  [{audience}] {}: {}",
            notification.title, notification.message
        );
    }

    Ok(())
}

fn sample_draft(
    id: &str,
    title: &str,
    description: &str,
    category: &str,
    user_price: Option<f64>,
) -> SubmissionDraft {
    SubmissionDraft {
        submission_id: SubmissionId(id.to_string()),
        title: title.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        images: Vec::new(),
        user_price,
    }
}
