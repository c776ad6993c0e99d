use std::sync::Arc;
use std::time::Duration;

use pei_authz::{
    Authorizer, FieldMask, InMemoryPermissionStore, PermissionCheck, RoleScopeRecord,
};
use pei_config::AuthzConfig;
use pei_models::{
    Action, Decision, DenyReason, ResourceScope, ResourceType, Role, SchoolId, StudentId,
    TenantId, UserId,
};

struct Network {
    store: Arc<InMemoryPermissionStore>,
    authz: Authorizer,
    t1: TenantId,
    s1: SchoolId,
    t2: TenantId,
    s2: SchoolId,
}

fn network_with(config: AuthzConfig) -> Network {
    let store = Arc::new(InMemoryPermissionStore::new());
    let authz = Authorizer::new(store.clone(), &config, None);
    Network {
        store,
        authz,
        t1: TenantId::new(),
        s1: SchoolId::new(),
        t2: TenantId::new(),
        s2: SchoolId::new(),
    }
}

fn network() -> Network {
    network_with(AuthzConfig::default())
}

impl Network {
    fn add(&self, roles: &[&str], tenant: Option<TenantId>, school: Option<SchoolId>) -> UserId {
        let user = UserId::new();
        self.store.set_user(
            user,
            RoleScopeRecord {
                roles: roles.iter().map(|r| r.to_string()).collect(),
                tenant_id: tenant,
                school_id: school,
            },
        );
        user
    }

    fn add_in_s1(&self, roles: &[&str]) -> UserId {
        self.add(roles, Some(self.t1), Some(self.s1))
    }

    async fn can(
        &self,
        user: UserId,
        action: Action,
        resource_type: ResourceType,
        resource: ResourceScope,
    ) -> Decision {
        self.authz
            .check_for_user(user, &PermissionCheck::new(action, resource_type, resource))
            .await
    }
}

// ============ Worked scenarios ============

#[tokio::test]
async fn test_teacher_views_student_in_own_school() {
    let net = network();
    let teacher = net.add_in_s1(&["teacher"]);
    let student_42 = ResourceScope::in_school(net.t1, net.s1).about_student(StudentId::new());

    let decision = net
        .can(teacher, Action::View, ResourceType::Student, student_42)
        .await;

    assert_eq!(decision, Decision::Allowed);
}

#[tokio::test]
async fn test_teacher_cannot_see_other_network() {
    let net = network();
    let teacher = net.add_in_s1(&["teacher"]);
    let student_99 = ResourceScope::in_school(net.t2, net.s2).about_student(StudentId::new());

    let decision = net
        .can(teacher, Action::View, ResourceType::Student, student_99)
        .await;

    assert_eq!(decision.reason(), Some(DenyReason::CrossTenant));
}

#[tokio::test]
async fn test_teacher_cannot_see_other_school_in_same_network() {
    let net = network();
    let teacher = net.add_in_s1(&["teacher"]);

    let decision = net
        .can(
            teacher,
            Action::View,
            ResourceType::Student,
            ResourceScope::in_school(net.t1, SchoolId::new()),
        )
        .await;

    assert_eq!(decision.reason(), Some(DenyReason::CrossSchool));
}

#[tokio::test]
async fn test_education_secretary_spans_schools_of_own_network() {
    let net = network();
    let secretary = net.add(&["education_secretary"], Some(net.t1), None);

    let other_school = ResourceScope::in_school(net.t1, SchoolId::new());
    assert!(
        net.can(secretary, Action::View, ResourceType::Student, other_school)
            .await
            .is_allowed()
    );

    let other_network = ResourceScope::in_school(net.t2, net.s2);
    assert_eq!(
        net.can(secretary, Action::View, ResourceType::Student, other_network)
            .await
            .reason(),
        Some(DenyReason::CrossTenant)
    );
}

#[tokio::test]
async fn test_only_superadmin_crosses_tenants() {
    let net = network();
    let child = StudentId::new();
    let elsewhere = [
        ResourceScope::in_school(net.t2, net.s2).about_student(child),
        ResourceScope::tenant_wide(net.t2).about_student(child),
    ];

    for role in Role::ALL.into_iter().filter(|r| *r != Role::Superadmin) {
        let user = net.add(&[role.as_str()], Some(net.t1), Some(net.s1));
        // A linked child, so family reaches the tenant gate.
        net.store.link_guardian(user, child);

        for resource_type in ResourceType::ALL {
            for action in Action::ALL {
                for resource in &elsewhere {
                    let decision = net.can(user, action, resource_type, resource.clone()).await;
                    assert!(
                        !decision.is_allowed(),
                        "{role} may {action} {resource_type} in another tenant"
                    );
                    assert!(!decision.is_indeterminate());
                }
            }
        }
    }
}

#[tokio::test]
async fn test_superadmin_is_allowed_everything() {
    let net = network();
    let admin = net.add(&["superadmin"], None, None);

    for resource_type in ResourceType::ALL {
        for action in Action::ALL {
            let decision = net
                .can(admin, action, resource_type, ResourceScope::in_school(net.t2, net.s2))
                .await;
            assert!(decision.is_allowed(), "{action} on {resource_type}");
        }
    }
}

#[tokio::test]
async fn test_unknown_user_is_denied() {
    let net = network();

    let decision = net
        .can(
            UserId::new(),
            Action::View,
            ResourceType::Student,
            ResourceScope::in_school(net.t1, net.s1),
        )
        .await;

    assert_eq!(decision.reason(), Some(DenyReason::NoRoles));
}

// ============ Family access ============

#[tokio::test]
async fn test_family_access_follows_guardian_link() {
    let net = network();
    let parent = net.add(&["family"], Some(net.t1), None);
    let child = StudentId::new();
    let resource = ResourceScope::in_school(net.t1, net.s1).about_student(child);

    let before = net
        .can(parent, Action::View, ResourceType::Pei, resource.clone())
        .await;
    assert_eq!(before.reason(), Some(DenyReason::MissingGuardianLink));

    net.store.link_guardian(parent, child);
    let linked = net
        .can(parent, Action::View, ResourceType::Pei, resource.clone())
        .await;
    assert!(linked.is_allowed());

    net.store.unlink_guardian(parent, child);
    let unlinked = net.can(parent, Action::View, ResourceType::Pei, resource).await;
    assert!(!unlinked.is_allowed());
}

#[tokio::test]
async fn test_family_needs_a_student() {
    let net = network();
    let parent = net.add(&["family"], Some(net.t1), None);

    let decision = net
        .can(
            parent,
            Action::View,
            ResourceType::Pei,
            ResourceScope::in_school(net.t1, net.s1),
        )
        .await;

    assert_eq!(decision.reason(), Some(DenyReason::MissingSubject));
}

#[tokio::test]
async fn test_family_link_failure_is_indeterminate() {
    let net = network();
    let parent = net.add(&["family"], Some(net.t1), None);
    let resource = ResourceScope::in_school(net.t1, net.s1).about_student(StudentId::new());

    // Warm the scope cache so only the link lookup fails.
    net.authz.resolve(parent).await.unwrap();
    net.store.set_failing(true);

    let decision = net.can(parent, Action::View, ResourceType::Student, resource).await;

    assert!(decision.is_indeterminate());
}

// ============ Role relations ============

#[tokio::test]
async fn test_lateral_roles_do_not_share_grants() {
    let net = network();
    let teacher = net.add_in_s1(&["teacher"]);
    let aee = net.add_in_s1(&["aee_teacher"]);
    let here = ResourceScope::in_school(net.t1, net.s1);

    assert!(!net.can(teacher, Action::Edit, ResourceType::Aee, here.clone()).await.is_allowed());
    assert!(!net.can(aee, Action::Edit, ResourceType::Pei, here.clone()).await.is_allowed());
    assert!(net.can(teacher, Action::Edit, ResourceType::Pei, here.clone()).await.is_allowed());
    assert!(net.can(aee, Action::Edit, ResourceType::Aee, here).await.is_allowed());
}

#[tokio::test]
async fn test_dominating_role_inherits_grants() {
    let net = network();
    let director = net.add_in_s1(&["school_director"]);
    let here = ResourceScope::in_school(net.t1, net.s1);

    // Declared for teacher and aee_teacher only.
    assert!(net.can(director, Action::Edit, ResourceType::Pei, here.clone()).await.is_allowed());
    assert!(net.can(director, Action::Edit, ResourceType::Aee, here).await.is_allowed());
}

#[tokio::test]
async fn test_decision_uses_primary_role() {
    let net = network();
    let user = net.add_in_s1(&["teacher", "family"]);

    let actor = net.authz.resolve(user).await.unwrap();
    assert_eq!(actor.primary_role(), Some(Role::Teacher));

    // Family would need a guardian link; as a teacher no link is consulted.
    let decision = net
        .can(
            user,
            Action::View,
            ResourceType::Student,
            ResourceScope::in_school(net.t1, net.s1).about_student(StudentId::new()),
        )
        .await;
    assert!(decision.is_allowed());
    assert_eq!(net.store.link_lookups(), 0);
}

// ============ Scope caching ============

#[tokio::test]
async fn test_role_change_needs_invalidation() {
    let net = network();
    let user = net.add_in_s1(&["teacher"]);
    let here = ResourceScope::in_school(net.t1, net.s1);

    assert!(!net.can(user, Action::Approve, ResourceType::Pei, here.clone()).await.is_allowed());

    net.store.set_user(
        user,
        RoleScopeRecord {
            roles: vec!["coordinator".to_string()],
            tenant_id: Some(net.t1),
            school_id: Some(net.s1),
        },
    );
    assert!(!net.can(user, Action::Approve, ResourceType::Pei, here.clone()).await.is_allowed());
    assert_eq!(net.store.scope_lookups(), 1);

    net.authz.invalidate_user(user).await;
    assert!(net.can(user, Action::Approve, ResourceType::Pei, here).await.is_allowed());
    assert_eq!(net.store.scope_lookups(), 2);
}

#[tokio::test]
async fn test_store_failure_is_indeterminate_and_not_cached() {
    let net = network();
    let user = net.add_in_s1(&["teacher"]);
    let here = ResourceScope::in_school(net.t1, net.s1);

    net.store.set_failing(true);
    let decision = net.can(user, Action::View, ResourceType::Student, here.clone()).await;
    assert!(decision.is_indeterminate());
    assert!(!decision.is_allowed());

    net.store.set_failing(false);
    assert!(net.can(user, Action::View, ResourceType::Student, here).await.is_allowed());
}

#[tokio::test]
async fn test_slow_store_times_out() {
    let net = network_with(AuthzConfig {
        lookup_timeout: Duration::from_millis(20),
        ..AuthzConfig::default()
    });
    let user = net.add_in_s1(&["teacher"]);
    net.store.set_latency(Some(Duration::from_millis(300)));

    let decision = net
        .can(
            user,
            Action::View,
            ResourceType::Student,
            ResourceScope::in_school(net.t1, net.s1),
        )
        .await;

    match decision {
        Decision::Indeterminate { detail } => assert!(detail.contains("timed out")),
        other => panic!("expected indeterminate, got {other:?}"),
    }
}

// ============ Batches ============

#[tokio::test]
async fn test_check_all_and_any() {
    let net = network();
    let teacher = net.add_in_s1(&["teacher"]);
    let here = ResourceScope::in_school(net.t1, net.s1);
    let checks = vec![
        PermissionCheck::new(Action::Delete, ResourceType::Student, here.clone()),
        PermissionCheck::new(Action::View, ResourceType::Student, here.clone()),
        PermissionCheck::new(Action::View, ResourceType::Student, ResourceScope::in_school(net.t2, net.s2)),
    ];

    let all = net.authz.check_all_for_user(teacher, &checks).await;
    assert_eq!(
        all.iter().map(Decision::is_allowed).collect::<Vec<_>>(),
        vec![false, true, false]
    );
    assert_eq!(all[2].reason(), Some(DenyReason::CrossTenant));

    assert!(net.authz.check_any_for_user(teacher, &checks).await.is_allowed());
    assert!(
        !net.authz
            .check_any_for_user(teacher, &[checks[0].clone(), checks[2].clone()])
            .await
            .is_allowed()
    );
}

// ============ Field rules ============

#[tokio::test]
async fn test_field_rules_fall_back_to_defaults_when_store_is_down() {
    let net = network();
    net.store.set_failing(true);

    let mask = net.authz.field_mask().await;

    assert_eq!(*mask, FieldMask::defaults());
    assert!(mask.is_visible(Role::Secretary, "cpf"));
    assert!(!mask.is_visible(Role::Teacher, "cpf"));
}
