use kruxdesk::domain::entities::BotResponse;
use kruxdesk::domain::services::intent_router::{
    classify, fallback_response, Intent, IntentRouter, IntentRule, Matcher, MAIN_MENU,
};

#[test]
fn test_classification_ignores_case() {
    let router = IntentRouter::default();
    for text in ["BUSINESS LOAN", "Business Loan", "business loan"] {
        assert_eq!(router.classify_intent(text), Intent::BusinessLoan);
    }
}

#[test]
fn test_every_built_in_rule_is_reachable() {
    let router = IntentRouter::default();
    let cases = [
        ("hi", Intent::Greeting),
        ("need a business loan", Intent::BusinessLoan),
        ("personal loan please", Intent::PersonalLoan),
        ("msme scheme", Intent::MsmeLoan),
        ("I need money", Intent::LoanApplication),
        ("track my file", Intent::ApplicationStatus),
        ("what papers", Intent::Documents),
        ("do I qualify", Intent::Eligibility),
        ("emi for 5 years", Intent::InterestRate),
        ("get me an executive", Intent::AgentEscalation),
        ("I don't know", Intent::Help),
        ("thank you", Intent::Gratitude),
        ("xyz", Intent::Fallback),
    ];

    for (text, expected) in cases {
        assert_eq!(router.classify_intent(text), expected, "routing {:?}", text);
    }
}

#[test]
fn test_greeting_wins_over_later_topics() {
    let router = IntentRouter::default();
    assert_eq!(
        router.classify_intent("Hello, I need a business loan"),
        Intent::Greeting
    );
}

#[test]
fn test_only_escalation_sets_escalate() {
    let router = IntentRouter::default();
    for rule in router.rules() {
        assert_eq!(
            rule.response.escalate,
            rule.intent == Intent::AgentEscalation,
            "rule {}",
            rule.intent
        );
        if rule.response.escalate {
            assert!(!rule.response.has_options());
        } else {
            assert!(rule.response.has_options());
        }
    }
}

#[test]
fn test_empty_text_falls_back_to_main_menu() {
    let response = classify("");
    assert_eq!(response, fallback_response());
    assert_eq!(response.options, MAIN_MENU.to_vec());
}

#[test]
fn test_custom_rule_list_is_first_match_wins() {
    let router = IntentRouter::new(
        vec![
            IntentRule {
                intent: Intent::Documents,
                matcher: Matcher::ContainsAny(vec!["kyc"]),
                response: BotResponse::with_options("KYC checklist", &["PAN", "Aadhaar"]),
            },
            IntentRule {
                intent: Intent::AgentEscalation,
                matcher: Matcher::ContainsAny(vec!["kyc", "agent"]),
                response: BotResponse::escalation("Connecting you"),
            },
        ],
        BotResponse::with_options("Sorry?", &["Start over"]),
    );

    let (intent, response) = router.route("KYC status");
    assert_eq!(intent, Intent::Documents);
    assert_eq!(response.message, "KYC checklist");

    assert_eq!(router.classify_intent("agent"), Intent::AgentEscalation);
    assert_eq!(router.classify("loan").message, "Sorry?");
}
