mod test_utils;

use axum::http::StatusCode;
use backend_lib::storage::Storage;
use complaint_desk_common::{ComplaintStatus, Role};
use test_utils::{body_text, location, seed_user, setup_test_env, TestClient, PASSWORD};

#[tokio::test]
async fn test_health_is_public() {
    let (state, _dir) = setup_test_env();
    let mut client = TestClient::new(state);

    let response = client.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_anonymous_request_redirects_to_login_with_flash() {
    let (state, _dir) = setup_test_env();
    let mut client = TestClient::new(state);

    let response = client.get("/").await;
    assert_eq!(location(&response), "/login");
    assert!(client.cookie.is_some());

    let page = client.page("/login").await;
    assert!(page.contains("You are not Authorized to view this page"));

    // flashes are shown once
    let page = client.page("/login").await;
    assert!(!page.contains("You are not Authorized to view this page"));
}

#[tokio::test]
async fn test_register_then_login() {
    let (state, _dir) = setup_test_env();
    let mut client = TestClient::new(state.clone());

    let fields = [
        ("name", "Asha Rao"),
        ("username", "asha"),
        ("email", "asha@example.edu"),
        ("password", PASSWORD),
        ("password2", PASSWORD),
        ("role", "student"),
        ("department", "Civil"),
    ];
    let response = client.post("/register", &fields).await;
    assert_eq!(location(&response), "/login");
    let page = client.page("/login").await;
    assert!(page.contains("You are Successfully Registered and can Log in"));

    let response = client.post("/register", &fields).await;
    assert_eq!(location(&response), "/register");
    let page = client.page("/register").await;
    assert!(page.contains("Username already exists"));

    let stored = state.storage.user_by_username("asha").await.unwrap().unwrap();
    assert_eq!(stored.role, Role::Student);
    assert_ne!(stored.password_hash, PASSWORD);

    assert_eq!(client.login("asha", PASSWORD).await, "/");
    let page = client.page("/").await;
    assert!(page.contains("Asha Rao"));
}

#[tokio::test]
async fn test_invalid_registration_rerenders_form() {
    let (state, _dir) = setup_test_env();
    let mut client = TestClient::new(state.clone());

    let response = client
        .post(
            "/register",
            &[
                ("name", "Asha"),
                ("username", "asha"),
                ("email", "not-an-email"),
                ("password", PASSWORD),
                ("password2", "something-else"),
                ("role", "student"),
                ("department", "Civil"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = body_text(response).await;
    assert!(page.contains("Email must be a valid email address"));
    assert!(page.contains("Passwords do not match"));
    assert!(page.contains(r#"value="asha""#));
    assert!(state.storage.user_by_username("asha").await.unwrap().is_none());
}

#[tokio::test]
async fn test_login_failures_flash_reason() {
    let (state, _dir) = setup_test_env();
    seed_user(&state, "asha", Role::Student, "Civil").await;
    let mut client = TestClient::new(state);

    assert_eq!(client.login("nobody", PASSWORD).await, "/login");
    assert!(client.page("/login").await.contains("No user found"));

    assert_eq!(client.login("asha", "wrong-password").await, "/login");
    assert!(client.page("/login").await.contains("Wrong Password"));

    assert_eq!(client.login("", "").await, "/login");
    assert!(client.page("/login").await.contains("Missing credentials"));
}

#[tokio::test]
async fn test_login_rotates_session_cookie() {
    let (state, _dir) = setup_test_env();
    seed_user(&state, "asha", Role::Student, "Civil").await;
    let mut client = TestClient::new(state.clone());

    client.get("/login").await;
    let anonymous = client.cookie.clone().unwrap();
    client.login("asha", PASSWORD).await;
    let signed_in = client.cookie.clone().unwrap();

    assert_ne!(anonymous, signed_in);
    let old_token = anonymous.split_once('=').unwrap().1;
    assert!(state.sessions.get(old_token).await.is_none());
}

#[tokio::test]
async fn test_role_gate_sends_user_home() {
    let (state, _dir) = setup_test_env();
    seed_user(&state, "asha", Role::Student, "Civil").await;
    seed_user(&state, "ravi", Role::Resolver, "Maintenance").await;

    let mut student = TestClient::new(state.clone());
    student.login("asha", PASSWORD).await;
    assert_eq!(location(&student.get("/admin").await), "/");
    assert!(student
        .page("/")
        .await
        .contains("You are not Authorized to view this page"));

    let mut resolver = TestClient::new(state);
    assert_eq!(resolver.login("ravi", PASSWORD).await, "/resolver");
    assert_eq!(location(&resolver.get("/complaint").await), "/resolver");
    assert_eq!(location(&resolver.get("/jeng").await), "/resolver");
}

#[tokio::test]
async fn test_logout() {
    let (state, _dir) = setup_test_env();
    seed_user(&state, "asha", Role::Student, "Civil").await;
    let mut client = TestClient::new(state.clone());
    client.login("asha", PASSWORD).await;
    let signed_in = client.cookie.clone().unwrap();

    assert_eq!(location(&client.get("/logout").await), "/login");
    assert_ne!(client.cookie.as_deref(), Some(signed_in.as_str()));
    assert!(client.page("/login").await.contains("You are logged out"));
    assert_eq!(location(&client.get("/").await), "/login");

    let old_token = signed_in.split_once('=').unwrap().1;
    assert!(state.sessions.get(old_token).await.is_none());
}

#[tokio::test]
async fn test_complaint_lifecycle() {
    let (state, _dir) = setup_test_env();
    let student_user = seed_user(&state, "asha", Role::Student, "Civil").await;
    seed_user(&state, "root", Role::Admin, "Office").await;
    seed_user(&state, "ravi", Role::Resolver, "Maintenance").await;
    seed_user(&state, "jen", Role::JuniorEngineer, "Civil").await;

    // student files a complaint
    let mut student = TestClient::new(state.clone());
    student.login("asha", PASSWORD).await;
    let response = student
        .post(
            "/registerComplaint",
            &[("title", "Broken tap"), ("description", "Hostel B second floor")],
        )
        .await;
    assert_eq!(location(&response), "/");
    assert!(student
        .page("/")
        .await
        .contains("Complaint registered successfully"));
    assert!(student.page("/my-complaints").await.contains("Broken tap"));

    let complaints = state.storage.complaints_by_user(student_user.id).await.unwrap();
    assert_eq!(complaints.len(), 1);
    let complaint = complaints[0].clone();
    assert_eq!(complaint.number, 1);
    assert_eq!(complaint.status, ComplaintStatus::Pending);
    let id = complaint.id.to_string();

    // admin sees it under the filer's department and assigns it
    let mut admin = TestClient::new(state.clone());
    assert_eq!(admin.login("root", PASSWORD).await, "/admin");
    let page = admin.page("/admin").await;
    assert!(page.contains("Civil"));
    assert!(page.contains("Broken tap"));
    assert!(page.contains("ravi"));

    let response = admin
        .post("/assign", &[("complaintID", id.as_str()), ("resolverName", "ravi")])
        .await;
    assert_eq!(location(&response), "/admin");
    assert!(admin
        .page("/admin")
        .await
        .contains("You have successfully assigned a complaint to Resolver"));

    // the junior engineer of the same department can read it
    let mut engineer = TestClient::new(state.clone());
    assert_eq!(engineer.login("jen", PASSWORD).await, "/jeng");
    assert!(engineer.page("/jeng").await.contains("Broken tap"));

    // resolver works it
    let mut resolver = TestClient::new(state.clone());
    resolver.login("ravi", PASSWORD).await;
    assert!(resolver.page("/resolver").await.contains("Broken tap"));

    let response = resolver
        .post_with_referer(
            "/updateStatus",
            "/resolver",
            &[("complaintID", id.as_str()), ("status", "Rejected")],
        )
        .await;
    assert_eq!(location(&response), "/resolver");
    assert!(resolver.page("/resolver").await.contains("Not authorized"));

    let response = resolver
        .post("/updateStatus", &[("complaintID", id.as_str()), ("status", "Resolved")])
        .await;
    assert_eq!(location(&response), "/resolver");

    let stored = state.storage.complaint(complaint.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ComplaintStatus::Resolved);
    assert!(stored.is_assigned_to(
        state.storage.user_by_username("ravi").await.unwrap().unwrap().id
    ));

    // admin may set any status
    let response = admin
        .post("/updateStatus", &[("complaintID", id.as_str()), ("status", "Rejected")])
        .await;
    assert_eq!(location(&response), "/admin");
    let stored = state.storage.complaint(complaint.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ComplaintStatus::Rejected);
}

#[tokio::test]
async fn test_resolver_cannot_touch_unassigned_complaint() {
    let (state, _dir) = setup_test_env();
    let student = seed_user(&state, "asha", Role::Student, "Civil").await;
    seed_user(&state, "ravi", Role::Resolver, "Maintenance").await;
    let complaint = state
        .storage
        .insert_complaint(backend_lib::storage::NewComplaint {
            title: "Fan".to_string(),
            description: "Noisy".to_string(),
            user_id: student.id,
        })
        .await
        .unwrap();

    let mut resolver = TestClient::new(state.clone());
    resolver.login("ravi", PASSWORD).await;
    let id = complaint.id.to_string();
    resolver
        .post("/updateStatus", &[("complaintID", id.as_str()), ("status", "Resolved")])
        .await;

    let stored = state.storage.complaint(complaint.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ComplaintStatus::Pending);
    assert!(resolver.page("/resolver").await.contains("Not authorized"));
}

#[tokio::test]
async fn test_invalid_complaint_form() {
    let (state, _dir) = setup_test_env();
    seed_user(&state, "asha", Role::Student, "Civil").await;
    let mut student = TestClient::new(state.clone());
    student.login("asha", PASSWORD).await;

    let response = student
        .post("/registerComplaint", &[("title", ""), ("description", "")])
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = body_text(response).await;
    assert!(page.contains("Title is required"));
    assert!(page.contains("Description is required"));
    assert!(state.storage.complaints().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_assign_to_non_resolver_is_refused() {
    let (state, _dir) = setup_test_env();
    let student = seed_user(&state, "asha", Role::Student, "Civil").await;
    seed_user(&state, "root", Role::Admin, "Office").await;
    let complaint = state
        .storage
        .insert_complaint(backend_lib::storage::NewComplaint {
            title: "Fan".to_string(),
            description: "Noisy".to_string(),
            user_id: student.id,
        })
        .await
        .unwrap();

    let mut admin = TestClient::new(state.clone());
    admin.login("root", PASSWORD).await;
    let id = complaint.id.to_string();
    let response = admin
        .post("/assign", &[("complaintID", id.as_str()), ("resolverName", "asha")])
        .await;
    assert_eq!(location(&response), "/admin");
    assert!(admin.page("/admin").await.contains("asha is not a resolver"));

    let stored = state.storage.complaint(complaint.id).await.unwrap().unwrap();
    assert!(stored.assignment.is_none());
}

#[tokio::test]
async fn test_unknown_complaint_id_flashes_and_redirects() {
    let (state, _dir) = setup_test_env();
    seed_user(&state, "root", Role::Admin, "Office").await;
    seed_user(&state, "ravi", Role::Resolver, "Maintenance").await;

    let mut admin = TestClient::new(state.clone());
    admin.login("root", PASSWORD).await;
    let unknown = uuid::Uuid::new_v4().to_string();

    let response = admin
        .post(
            "/assign",
            &[("complaintID", unknown.as_str()), ("resolverName", "ravi")],
        )
        .await;
    assert_eq!(location(&response), "/admin");
    assert!(admin.page("/admin").await.contains("Complaint not found"));

    let response = admin
        .post_with_referer(
            "/updateStatus",
            "/admin",
            &[("complaintID", unknown.as_str()), ("status", "Resolved")],
        )
        .await;
    assert_eq!(location(&response), "/admin");
    assert!(admin.page("/admin").await.contains("Complaint not found"));

    let mut resolver = TestClient::new(state);
    resolver.login("ravi", PASSWORD).await;
    let response = resolver
        .post(
            "/updateStatus",
            &[("complaintID", unknown.as_str()), ("status", "Resolved")],
        )
        .await;
    assert_eq!(location(&response), "/resolver");
    assert!(resolver.page("/resolver").await.contains("Complaint not found"));
}

#[tokio::test]
async fn test_failed_logins_feed_shared_throttle() {
    let (state, _dir) = setup_test_env();
    seed_user(&state, "asha", Role::Student, "Civil").await;
    seed_user(&state, "Asha", Role::Student, "Civil").await;
    let mut client = TestClient::new(state.clone());

    let attempts = state.settings.login_throttle.max_attempts;
    for _ in 0..attempts {
        assert_eq!(client.login("Asha", "wrong-password").await, "/login");
    }
    assert!(!state.throttle.check("Asha"));
    assert!(state.throttle.check("asha"));

    assert_eq!(client.login("asha", PASSWORD).await, "/");
}
