use charity_market::listing::{next_step, WizardStep};

#[test]
fn start_and_review_transitions() {
    for message in ["", "hello", "donate", "I'll sell it"] {
        assert_eq!(next_step(WizardStep::Start, message), WizardStep::Category);
        assert_eq!(next_step(WizardStep::Review, message), WizardStep::Review);
    }
}

#[test]
fn submission_type_branches_on_donation_intent() {
    assert_eq!(
        next_step(WizardStep::SubmissionType, "I want to donate this"),
        WizardStep::Description
    );
    assert_eq!(
        next_step(WizardStep::SubmissionType, "I'll sell it"),
        WizardStep::Price
    );
}

#[test]
fn selling_walks_every_step_and_donating_skips_price() {
    let walk = |answers: &[&str]| {
        let mut step = WizardStep::Start;
        let mut visited = vec![step];
        for answer in answers {
            step = next_step(step, answer);
            visited.push(step);
        }
        visited
    };

    let selling = walk(&["hi", "Home", "Oak table", "Good", "sell", "20", "Sturdy", "done"]);
    assert_eq!(selling, WizardStep::ORDER.to_vec());

    let donating = walk(&["hi", "Toys", "Train set", "Like new", "Free to a good home"]);
    assert_eq!(donating.last(), Some(&WizardStep::Description));
    assert!(!donating.contains(&WizardStep::Price));
}
