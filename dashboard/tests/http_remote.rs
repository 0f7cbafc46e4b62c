use axum::{http::StatusCode, routing::get, Router};
use chrono::NaiveDate;
use club_dashboard::remote::http;
use club_dashboard::{Dashboard, DashboardError, HttpError, HttpRemote, NoticeLevel, Settings};
use shared::{CreateClubParams, CreateExpenseParams, CreateMemberParams};
use tokio::net::TcpListener;
use tokio_test::{assert_err, assert_ok};

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}/api")
}

fn connect(base_url: String) -> Dashboard<HttpRemote> {
    Dashboard::connect(&Settings {
        api: http::Settings {
            base_url,
            timeout_secs: 5,
        },
    })
    .unwrap()
}

fn expense(name: &str, amount: f64, date: &str) -> CreateExpenseParams {
    CreateExpenseParams {
        expense_name: name.to_string(),
        expense_amount: amount,
        expense_date: date.parse().unwrap(),
        description: None,
        category: Some("Food".to_string()),
    }
}

#[tokio::test]
async fn test_budget_flow_against_backend() {
    let dashboard = connect(spawn(fake_backend::create_app()).await);
    assert_ok!(dashboard.start().await);
    {
        let session = dashboard.session().await;
        assert!(session.clubs().is_empty());
        assert_eq!(session.roles().len(), 4);
        assert!(session.categories().contains(&"Food".to_string()));
    }

    assert_ok!(
        dashboard
            .create_club(CreateClubParams {
                club_name: "Chess".to_string(),
                contact_email: "chess@example.edu".to_string(),
                founded_date: NaiveDate::from_ymd_opt(2015, 9, 1),
                ..Default::default()
            })
            .await
    );
    let club = dashboard.session().await.clubs().items()[0].club_id;
    assert_ok!(dashboard.select_club(club).await);
    assert_eq!(
        dashboard.session().await.members().empty_notice("members").as_deref(),
        Some("No members found")
    );

    assert_ok!(
        dashboard
            .add_member(CreateMemberParams {
                student_id: "S1".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: "ada@example.edu".to_string(),
                major: Some("Mathematics".to_string()),
                graduation_year: Some(2026),
                ..Default::default()
            })
            .await
    );
    assert_eq!(
        dashboard.session().await.member_charts().majors.get("Mathematics"),
        Some(&1)
    );

    assert_ok!(dashboard.add_budget(2024, 1000.0).await);
    assert_ok!(dashboard.add_expense(expense("Pizza", 50.0, "2024-03-01")).await);
    assert_ok!(dashboard.add_expense(expense("Board", 25.0, "2024-03-02")).await);

    // the optimistic numbers agree with a fresh fetch
    let optimistic = dashboard.session().await.budget().loaded().cloned().unwrap();
    assert_ok!(dashboard.select_fiscal_year(2024).await);
    let fetched = dashboard.session().await.budget().loaded().cloned().unwrap();
    assert_eq!(fetched.spent_amount, optimistic.spent_amount);
    assert_eq!(fetched.remaining_amount, 925.0);
    assert_eq!(dashboard.session().await.expenses().len(), 2);

    assert_ok!(dashboard.update_total_budget(1500.0).await);
    let id = dashboard.session().await.expenses().items()[0].expense_id;
    assert_ok!(dashboard.delete_expense(id).await);

    let session = dashboard.session().await;
    let budget = session.budget().loaded().unwrap();
    assert_eq!(budget.total_budget, 1500.0);
    assert_eq!(budget.spent_amount, 25.0);
    assert_eq!(budget.remaining_amount, 1475.0);
    assert_eq!(session.selection().fiscal_years(), [2024]);
    let bar = session.budget_bar().unwrap();
    assert!(!bar.over_budget);
    assert!((bar.spent_fraction - 25.0 / 1500.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_server_error_message_reaches_the_notice() {
    let dashboard = connect(spawn(fake_backend::create_app()).await);
    assert_ok!(
        dashboard
            .create_club(CreateClubParams {
                club_name: "Chess".to_string(),
                contact_email: "chess@example.edu".to_string(),
                ..Default::default()
            })
            .await
    );
    let club = dashboard.session().await.clubs().items()[0].club_id;
    assert_ok!(dashboard.select_club(club).await);
    dashboard.take_notices().await;

    let err = assert_err!(dashboard.remove_member("S404").await);
    assert_eq!(
        err,
        DashboardError::Http(HttpError::ServerRejected {
            status: 404,
            message: "Member not found".to_string(),
        })
    );
    let notices = dashboard.take_notices().await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, "Member not found");
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dashboard = connect(format!("http://{addr}/api"));
    let err = assert_err!(dashboard.refresh_clubs().await);
    assert!(matches!(
        err,
        DashboardError::Http(HttpError::NetworkUnavailable(_))
    ));
}

#[tokio::test]
async fn test_malformed_bodies_are_reported_not_raised() {
    let app = Router::new()
        .route("/api/clubs", get(|| async { "<html>maintenance</html>" }))
        .route(
            "/api/roles/",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
    let dashboard = connect(spawn(app).await);

    let err = assert_err!(dashboard.refresh_clubs().await);
    assert!(matches!(err, DashboardError::Http(HttpError::DecodeFailed(_))));
    assert!(!dashboard.session().await.clubs().is_loading());

    let err = assert_err!(dashboard.refresh_roles().await);
    assert_eq!(
        err,
        DashboardError::Http(HttpError::ServerRejected {
            status: 500,
            message: "Request failed with status 500".to_string(),
        })
    );
}
