use crate::domain::entities::BotResponse;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Topic recognised in a customer utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Greeting,
    BusinessLoan,
    PersonalLoan,
    MsmeLoan,
    LoanApplication,
    ApplicationStatus,
    Documents,
    Eligibility,
    InterestRate,
    AgentEscalation,
    Help,
    Gratitude,
    Fallback,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::BusinessLoan => "business_loan",
            Intent::PersonalLoan => "personal_loan",
            Intent::MsmeLoan => "msme_loan",
            Intent::LoanApplication => "loan_application",
            Intent::ApplicationStatus => "application_status",
            Intent::Documents => "documents",
            Intent::Eligibility => "eligibility",
            Intent::InterestRate => "interest_rate",
            Intent::AgentEscalation => "agent_escalation",
            Intent::Help => "help",
            Intent::Gratitude => "gratitude",
            Intent::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a rule tests the case-folded utterance
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Anchored at the start of the text
    Prefix(Regex),
    /// Any of the keywords appears anywhere in the text
    ContainsAny(Vec<&'static str>),
}

impl Matcher {
    pub fn matches(&self, normalized: &str) -> bool {
        match self {
            Matcher::Prefix(re) => re.is_match(normalized),
            Matcher::ContainsAny(keywords) => keywords.iter().any(|k| normalized.contains(k)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntentRule {
    pub intent: Intent,
    pub matcher: Matcher,
    pub response: BotResponse,
}

/// First-match-wins rule list mapping customer text to a canned reply.
///
/// Rule order is priority: product-specific loan rules sit ahead of the generic
/// loan rule, and the agent rule sits behind every product topic.
#[derive(Debug, Clone)]
pub struct IntentRouter {
    rules: Vec<IntentRule>,
    fallback: BotResponse,
}

pub const GREETING_MESSAGE: &str = "Hello! Welcome to KRUX Finance. I'm here to help you with your loan application. How can I assist you today?";

pub const MAIN_MENU: [&str; 4] = [
    "Apply for a loan",
    "Check application status",
    "Document requirements",
    "Speak to an agent",
];

impl IntentRouter {
    pub fn new(rules: Vec<IntentRule>, fallback: BotResponse) -> Self {
        Self { rules, fallback }
    }

    /// Shared instance with the built-in loan assistant rules
    pub fn shared() -> &'static IntentRouter {
        static ROUTER: OnceLock<IntentRouter> = OnceLock::new();
        ROUTER.get_or_init(IntentRouter::default)
    }

    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }

    /// Pick the reply for `text`, returning the matched intent alongside it
    pub fn route(&self, text: &str) -> (Intent, &BotResponse) {
        let normalized = text.to_lowercase();

        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(&normalized))
            .map(|rule| (rule.intent, &rule.response))
            .unwrap_or((Intent::Fallback, &self.fallback))
    }

    pub fn classify(&self, text: &str) -> BotResponse {
        self.route(text).1.clone()
    }

    pub fn classify_intent(&self, text: &str) -> Intent {
        self.route(text).0
    }
}

impl Default for IntentRouter {
    fn default() -> Self {
        Self::new(loan_assistant_rules(), fallback_response())
    }
}

/// Classify with the built-in rules
pub fn classify(text: &str) -> BotResponse {
    IntentRouter::shared().classify(text)
}

fn contains(keywords: &[&'static str]) -> Matcher {
    Matcher::ContainsAny(keywords.to_vec())
}

fn rule(intent: Intent, matcher: Matcher, response: BotResponse) -> IntentRule {
    IntentRule {
        intent,
        matcher,
        response,
    }
}

pub fn greeting_response() -> BotResponse {
    BotResponse::with_options(GREETING_MESSAGE, &MAIN_MENU)
}

pub fn fallback_response() -> BotResponse {
    BotResponse::with_options(
        "I understand you need assistance. Let me connect you with our support team for personalized help.",
        &MAIN_MENU,
    )
}

fn loan_assistant_rules() -> Vec<IntentRule> {
    let greeting = Regex::new(r"^(hi|hello|hey|namaste)").expect("greeting pattern is valid");

    vec![
        rule(Intent::Greeting, Matcher::Prefix(greeting), greeting_response()),
        rule(
            Intent::BusinessLoan,
            contains(&["business loan"]),
            BotResponse::with_options(
                "Business Loans from KRUX Finance:\n\n✓ Loan amount: ₹5 Lakh to ₹50 Crore\n✓ Interest rates starting from 10.5%\n✓ Tenure: Up to 5 years\n✓ Quick approval in 48 hours\n\nRequired documents:\n• PAN & Aadhaar\n• Business registration proof\n• Last 2 years ITR\n• Bank statements (6 months)\n• GST registration\n\nWould you like to proceed with the application?",
                &[
                    "Yes, start application",
                    "Document requirements",
                    "Check eligibility",
                    "Speak to loan officer",
                ],
            ),
        ),
        rule(
            Intent::PersonalLoan,
            contains(&["personal loan"]),
            BotResponse::with_options(
                "Personal Loans from KRUX Finance:\n\n✓ Loan amount: ₹50,000 to ₹25 Lakh\n✓ Interest rates starting from 11.5%\n✓ Tenure: Up to 3 years\n✓ Minimal documentation\n✓ Quick disbursal\n\nRequired documents:\n• PAN & Aadhaar\n• Salary slips (last 3 months)\n• Bank statements (6 months)\n• Employment proof\n\nShall we begin your application?",
                &[
                    "Start application",
                    "Check eligibility",
                    "EMI calculator",
                    "Speak to agent",
                ],
            ),
        ),
        rule(
            Intent::MsmeLoan,
            contains(&["msme"]),
            BotResponse::with_options(
                "MSME Loans from KRUX Finance:\n\n✓ Loan amount: ₹10 Lakh to ₹10 Crore\n✓ Competitive interest rates\n✓ Collateral-free options available\n✓ Government scheme benefits\n\nRequired documents:\n• Business registration\n• MSME/Udyam certificate\n• Financial statements\n• Bank statements\n• GST returns\n\nWould you like assistance with the application?",
                &[
                    "Apply now",
                    "Eligibility criteria",
                    "Required documents",
                    "Talk to expert",
                ],
            ),
        ),
        rule(
            Intent::LoanApplication,
            contains(&["apply", "loan", "need money"]),
            BotResponse::with_options(
                "Great! We offer several types of loans:\n\n1. Business Loan - For growing your business\n2. Personal Loan - For personal needs\n3. MSME Loan - For micro, small & medium enterprises\n\nWhich type of loan are you interested in?",
                &[
                    "Business Loan",
                    "Personal Loan",
                    "MSME Loan",
                    "Not sure, need help deciding",
                ],
            ),
        ),
        rule(
            Intent::ApplicationStatus,
            contains(&["status", "track", "application"]),
            BotResponse::with_options(
                "I can help you check your application status. Please provide your Application ID or registered phone number.",
                &[
                    "I have Application ID",
                    "Use phone number",
                    "Forgot Application ID",
                    "Speak to agent",
                ],
            ),
        ),
        rule(
            Intent::Documents,
            contains(&["document", "paper", "proof"]),
            BotResponse::with_options(
                "Common documents required for loan applications:\n\n📄 Identity Proof:\n• PAN Card\n• Aadhaar Card\n• Passport\n\n📄 Address Proof:\n• Aadhaar\n• Utility bills\n• Rent agreement\n\n📄 Income Proof:\n• Salary slips / ITR\n• Bank statements\n\nSpecific requirements vary by loan type. Which loan are you interested in?",
                &[
                    "Business Loan docs",
                    "Personal Loan docs",
                    "MSME Loan docs",
                    "General query",
                ],
            ),
        ),
        rule(
            Intent::Eligibility,
            contains(&["eligib", "qualify", "criteria"]),
            BotResponse::with_options(
                "General eligibility criteria:\n\n✓ Age: 21-65 years\n✓ Citizenship: Indian resident\n✓ Credit score: 650+\n✓ Stable income source\n✓ Valid KYC documents\n\nFor specific loan eligibility, please select your loan type or speak with our team.",
                &[
                    "Business Loan eligibility",
                    "Personal Loan eligibility",
                    "MSME eligibility",
                    "Check my eligibility",
                ],
            ),
        ),
        rule(
            Intent::InterestRate,
            contains(&["interest", "rate", "emi"]),
            BotResponse::with_options(
                "Interest rates at KRUX Finance:\n\n• Personal Loan: Starting 11.5% p.a.\n• Business Loan: Starting 10.5% p.a.\n• MSME Loan: Starting 10% p.a.\n\nRates depend on:\n- Credit score\n- Loan amount\n- Tenure\n- Business vintage\n\nWould you like to calculate your EMI?",
                &["EMI calculator", "Rate details", "Apply for loan", "Speak to agent"],
            ),
        ),
        rule(
            Intent::AgentEscalation,
            contains(&["agent", "human", "talk", "speak", "officer", "executive"]),
            BotResponse::escalation(
                "I'll connect you with one of our support agents right away. A team member will be with you shortly to assist with your query.",
            ),
        ),
        rule(
            Intent::Help,
            contains(&["help", "confused", "don't know"]),
            BotResponse::with_options(
                "I'm here to help! Here are some things I can assist you with:",
                &[
                    "Apply for a loan",
                    "Check application status",
                    "Document requirements",
                    "Eligibility criteria",
                    "Interest rates & EMI",
                    "Speak to an agent",
                ],
            ),
        ),
        rule(
            Intent::Gratitude,
            contains(&["thank", "thanks"]),
            BotResponse::with_options(
                "You're welcome! Is there anything else I can help you with?",
                &[
                    "Apply for loan",
                    "Check status",
                    "More information",
                    "That's all, thanks!",
                ],
            ),
        ),
    ]
}
