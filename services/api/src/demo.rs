use crate::infra::{
    parse_credit_score, parse_loan_program, parse_occupancy, InMemoryLeadNotifier,
    InMemoryLeadRepository,
};
use brokerage::calculator::{self, AffordabilityEstimate, AffordabilityInput};
use brokerage::catalog::ServiceId;
use brokerage::config::AppConfig;
use brokerage::error::AppError;
use brokerage::leads::LeadService;
use brokerage::questionnaire::domain::{
    ContactMethod, CreditScoreRange, EscrowChoice, LienPosition, LoanProgram, LoanPurpose,
    Occupancy, OwnershipHistory, PropertyKind, PurchaseMethod, RealEstateIntent, RefinanceKind,
};
use brokerage::questionnaire::{
    ContactDetails, DeviceStorage, FileStorage, MemoryStorage, MortgageAnswer, MortgageStep,
    Navigation, QuestionnaireFlow, RealEstateAnswer, RealEstateStep, ServiceDetails, StepAnswer,
    StepId,
};
use brokerage::selection::SelectedServices;
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct CalculateArgs {
    /// Gross yearly income in dollars
    #[arg(long)]
    pub(crate) yearly_income: f64,
    /// Recurring monthly debt payments
    #[arg(long, default_value_t = 0.0)]
    pub(crate) monthly_debts: f64,
    /// Credit band as shown in the questionnaire, e.g. 740-759
    #[arg(long, value_parser = parse_credit_score)]
    pub(crate) credit_score: CreditScoreRange,
    /// Conventional, FHA, VA, USDA, Jumbo, DSCR or Non-QM
    #[arg(long, value_parser = parse_loan_program, default_value = "conventional")]
    pub(crate) loan_program: LoanProgram,
    /// primary, secondary or investment
    #[arg(long, value_parser = parse_occupancy, default_value = "primary")]
    pub(crate) occupancy: Occupancy,
    /// Cash down payment, used to estimate the purchase price
    #[arg(long)]
    pub(crate) down_payment: Option<f64>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Comma-separated service keys in selection order
    #[arg(long, value_delimiter = ',', default_value = "realEstate,mortgage,insurance")]
    pub(crate) services: Vec<String>,
    /// Walk the refinance branch of the mortgage questionnaire
    #[arg(long)]
    pub(crate) refinance: bool,
    /// Mirror answers to the configured questionnaire store instead of memory
    #[arg(long)]
    pub(crate) persist: bool,
}

pub(crate) fn run_calculate(args: CalculateArgs) -> Result<(), AppError> {
    let input = AffordabilityInput {
        yearly_income: args.yearly_income,
        monthly_debts: args.monthly_debts,
        credit_score: args.credit_score,
        loan_program: args.loan_program,
        occupancy: args.occupancy,
        down_payment: args.down_payment,
    };
    input.validate()?;
    render_estimate(&calculator::estimate(&input));
    Ok(())
}

fn render_estimate(estimate: &AffordabilityEstimate) {
    println!("Affordability estimate");
    println!("  Monthly income:        ${:.2}", estimate.monthly_income);
    println!("  Max DTI:               {:.0}%", estimate.max_dti * 100.0);
    println!("  Available payment:     ${:.2}", estimate.available_payment);
    println!("  Interest rate:         {:.3}%", estimate.interest_rate);
    println!("  Loan amount:           ${:.0}", estimate.loan_amount);
    println!(
        "  Principal & interest:  ${:.2}",
        estimate.principal_and_interest
    );
    println!(
        "  Taxes / insurance:     ${:.2} / ${:.2}",
        estimate.monthly_tax, estimate.monthly_insurance
    );
    if let Some(price) = estimate.max_purchase_price {
        println!("  Max purchase price:    ${price:.0}");
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let mut ids = Vec::new();
    for key in &args.services {
        match ServiceId::from_key(key) {
            Some(id) => ids.push(id),
            None => eprintln!("ignoring unknown service '{key}'"),
        }
    }

    let storage: Box<dyn DeviceStorage> = if args.persist {
        let config = AppConfig::load()?;
        println!(
            "Mirroring answers under {}",
            config.questionnaire.store_dir.display()
        );
        Box::new(FileStorage::new(config.questionnaire.store_dir))
    } else {
        Box::new(MemoryStorage::new())
    };

    let mut flow = QuestionnaireFlow::start(SelectedServices::from_ids(ids), storage)?;
    println!("Questionnaire session {}", flow.session_id());

    let purpose = if args.refinance {
        LoanPurpose::Refinance
    } else {
        LoanPurpose::Purchase
    };

    loop {
        let step = match flow.current() {
            Navigation::Step(step) => step,
            Navigation::Review => break,
            other => {
                println!("Questionnaire ended at {other:?}");
                return Ok(());
            }
        };

        let progress = flow.progress();
        println!(
            "  [{:>3}%] step {}/{}: {}",
            progress.percent,
            progress.current,
            progress.total,
            step.name()
        );

        let answer = match step {
            StepId::Mortgage(MortgageStep::LoanAnalysis) => {
                if let Some(estimate) = flow.loan_analysis() {
                    render_estimate(&estimate);
                }
                StepAnswer::Mortgage(mortgage_answer(MortgageStep::LoanAnalysis, purpose))
            }
            StepId::Mortgage(step) => StepAnswer::Mortgage(mortgage_answer(step, purpose)),
            StepId::RealEstate(step) => StepAnswer::RealEstate(real_estate_answer(step)),
            StepId::Details(service) => StepAnswer::Details(ServiceDetails {
                selected_options: vec![service.category().options[0].to_string()],
                property_address: Some(DEMO_ADDRESS.to_string()),
                notes: None,
            }),
            StepId::Contact => StepAnswer::Contact(ContactDetails {
                first_name: "Dana".to_string(),
                last_name: "Reyes".to_string(),
                email: "dana.reyes@example.com".to_string(),
                phone: "(813) 555-0142".to_string(),
                preferred_contact: Some(ContactMethod::Email),
            }),
        };
        flow.submit(answer)?;
    }

    let submission = flow.submission()?;
    let repository = Arc::new(InMemoryLeadRepository::default());
    let notifier = Arc::new(InMemoryLeadNotifier::default());
    let service = LeadService::new(repository.clone(), notifier.clone());
    let record = service.submit(submission)?;
    flow.mark_submitted()?;

    let view = record.view();
    println!(
        "Lead {} {} for {} ({} services)",
        view.id.0,
        view.status,
        view.contact_name,
        view.services.len()
    );
    println!(
        "Stored submissions: {}, notifications sent: {}",
        repository.submissions().len(),
        notifier.events().len()
    );
    Ok(())
}

const DEMO_ADDRESS: &str = "4102 W Bay Ave, Tampa, FL 33616";

fn mortgage_answer(step: MortgageStep, purpose: LoanPurpose) -> MortgageAnswer {
    match step {
        MortgageStep::Type => MortgageAnswer::Type {
            purpose: Some(purpose),
        },
        MortgageStep::HomeOwnershipHistory => MortgageAnswer::HomeOwnershipHistory {
            ownership_history: Some(OwnershipHistory::FirstTimeBuyer),
        },
        MortgageStep::CreditScore => MortgageAnswer::CreditScore {
            credit_score: Some(CreditScoreRange::VeryGood),
        },
        MortgageStep::Location => MortgageAnswer::Location {
            address: DEMO_ADDRESS.to_string(),
            place_id: None,
            city: Some("Tampa".to_string()),
            zip_code: Some("33616".to_string()),
        },
        MortgageStep::Ownership => MortgageAnswer::Ownership {
            ownership_type: Some(Occupancy::Primary),
        },
        MortgageStep::LoanType => MortgageAnswer::LoanType {
            loan_type: Some(LoanProgram::Conventional),
        },
        MortgageStep::NonQm => MortgageAnswer::NonQm {
            documentation_types: Vec::new(),
        },
        MortgageStep::LenderPrice => MortgageAnswer::LenderPrice {
            property_value: Some(450_000.0),
            down_payment: Some(90_000.0),
        },
        MortgageStep::Income => MortgageAnswer::Income {
            yearly_income: Some(120_000.0),
            monthly_debts: Some(500.0),
        },
        MortgageStep::Plaid => MortgageAnswer::Plaid {
            accounts_linked: false,
            institution: None,
        },
        MortgageStep::TaxesInsurance => MortgageAnswer::TaxesInsurance {
            annual_property_tax: Some(5_400.0),
            annual_insurance: Some(2_900.0),
        },
        MortgageStep::LoanAnalysis => MortgageAnswer::LoanAnalysis {
            wants_preapproval: Some(true),
        },
        MortgageStep::RefinanceLienType => MortgageAnswer::RefinanceLienType {
            lien_type: Some(LienPosition::First),
        },
        MortgageStep::LoanBalance => MortgageAnswer::LoanBalance {
            loan_balance: Some(212_000.0),
        },
        MortgageStep::RefinanceType => MortgageAnswer::RefinanceType {
            refinance_type: Some(RefinanceKind::RateAndTerm),
            cash_out_amount: None,
        },
        MortgageStep::Escrow => MortgageAnswer::Escrow {
            escrow: Some(EscrowChoice::Include),
        },
    }
}

fn real_estate_answer(step: RealEstateStep) -> RealEstateAnswer {
    match step {
        RealEstateStep::Initial => RealEstateAnswer::Initial {
            intent: Some(RealEstateIntent::Buy),
        },
        RealEstateStep::SellType => RealEstateAnswer::SellType {
            sell_property_type: Some(PropertyKind::SingleFamily),
            timeline: Some("3-6 months".to_string()),
        },
        RealEstateStep::BuyType => RealEstateAnswer::BuyType {
            buy_property_type: Some(PropertyKind::SingleFamily),
            price_range: Some("400k-500k".to_string()),
        },
        RealEstateStep::PurchaseMethod => RealEstateAnswer::PurchaseMethod {
            purchase_method: Some(PurchaseMethod::Mortgage),
        },
        RealEstateStep::CashPurchase => RealEstateAnswer::CashPurchase {
            cash_budget: None,
            proof_of_funds: false,
        },
        RealEstateStep::MortgageHandoff => RealEstateAnswer::MortgageHandoff {
            preapproved: Some(false),
        },
        RealEstateStep::SellProperty => RealEstateAnswer::SellProperty {
            sell_address: String::new(),
            estimated_value: None,
        },
    }
}
