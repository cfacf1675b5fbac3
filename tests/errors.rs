/// Failure handling tests
///
/// Failed creations must surface the right error and leave no partial
/// singleton behind; slot assignment failures follow the configured policy.

use ferrous_beans::{
    AutoProxyCreator, Autowired, BeanDefinition, BeanFactory, BeanState, DefaultBeanFactory,
    DiError, FactoryConfig, FieldFailurePolicy, Interceptor,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

trait Greeter: Send + Sync {
    fn greet(&self) -> &'static str;
}

#[derive(Default)]
struct English;

impl Greeter for English {
    fn greet(&self) -> &'static str {
        "hello"
    }
}

#[derive(Default)]
struct French;

impl Greeter for French {
    fn greet(&self) -> &'static str {
        "bonjour"
    }
}

#[derive(Default)]
struct Host {
    greeter: Autowired<dyn Greeter>,
}

fn host_definition() -> BeanDefinition {
    BeanDefinition::builder::<Host, _>(Host::default)
        .autowire_trait::<dyn Greeter, _>("greeter", |h, g| h.greeter.set(g))
        .build()
}

fn counted_greeter<T>(calls: &Arc<AtomicUsize>, make: fn() -> T) -> BeanDefinition
where
    T: Greeter + 'static,
{
    let calls = calls.clone();
    BeanDefinition::builder::<T, _>(move || {
        calls.fetch_add(1, Ordering::SeqCst);
        make()
    })
    .provides::<dyn Greeter, _>(|g| g as Arc<dyn Greeter>)
    .build()
}

// ===== Ambiguity =====

#[test]
fn test_ambiguous_slot_fails_owner_without_side_effects() {
    let calls = Arc::new(AtomicUsize::new(0));
    let factory = DefaultBeanFactory::new();
    factory.register_bean_definition("english", counted_greeter(&calls, || English));
    factory.register_bean_definition("french", counted_greeter(&calls, || French));
    factory.register_bean_definition("host", host_definition());

    match factory.get_bean("host") {
        Err(DiError::TypeAmbiguous { candidates, .. }) => {
            assert_eq!(candidates, vec!["english".to_string(), "french".to_string()]);
        }
        other => panic!("expected TypeAmbiguous, got {:?}", other),
    }

    // No partial singleton for the owner, no candidate instantiated.
    assert!(!factory.contains_singleton("host"));
    assert_eq!(factory.bean_state("host"), BeanState::Unknown);
    assert_eq!(factory.singleton_count(), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    // The failure repeats; it is not cached as a success.
    assert!(matches!(factory.get_bean("host"), Err(DiError::TypeAmbiguous { .. })));
}

#[test]
fn test_ambiguous_type_lookup() {
    let factory = DefaultBeanFactory::new();
    factory.register_bean_definition(
        "english",
        BeanDefinition::builder::<English, _>(English::default)
            .provides::<dyn Greeter, _>(|g| g as Arc<dyn Greeter>)
            .build(),
    );
    factory.register_bean_definition(
        "french",
        BeanDefinition::builder::<French, _>(French::default)
            .provides::<dyn Greeter, _>(|g| g as Arc<dyn Greeter>)
            .build(),
    );

    assert!(matches!(
        factory.get_bean_of_trait::<dyn Greeter>(),
        Err(DiError::TypeAmbiguous { .. })
    ));
    // Lookup by name is unaffected.
    assert_eq!(factory.get_bean_trait::<dyn Greeter>("french").unwrap().greet(), "bonjour");
}

// ===== Instantiation =====

#[test]
fn test_instantiation_failure() {
    let factory = DefaultBeanFactory::new();
    factory.register_bean_definition(
        "english",
        BeanDefinition::try_builder::<English, _>(|| Err("dictionary missing".to_string()))
            .provides::<dyn Greeter, _>(|g| g as Arc<dyn Greeter>)
            .build(),
    );
    factory.register_bean_definition("host", host_definition());

    match factory.get_bean("host") {
        Err(DiError::InstantiationFailed { bean, reason }) => {
            assert_eq!(bean, "english");
            assert_eq!(reason, "dictionary missing");
        }
        other => panic!("expected InstantiationFailed, got {:?}", other),
    }
    assert_eq!(factory.bean_state("english"), BeanState::Unknown);
    assert_eq!(factory.bean_state("host"), BeanState::Unknown);
}

// ===== Cleanup and Retry =====

#[derive(Default)]
struct Left {
    right: Autowired<Right>,
}

#[derive(Default)]
struct Right {
    left: Autowired<Left>,
    greeter: Autowired<dyn Greeter>,
}

#[test]
fn test_failure_inside_cycle_discards_every_member() {
    let factory = DefaultBeanFactory::new();
    factory.register_bean_definition(
        "left",
        BeanDefinition::builder::<Left, _>(Left::default)
            .autowire::<Right, _>("right", |l, r| l.right.set(r))
            .build(),
    );
    factory.register_bean_definition(
        "right",
        BeanDefinition::builder::<Right, _>(Right::default)
            .autowire::<Left, _>("left", |r, l| r.left.set(l))
            .autowire_trait::<dyn Greeter, _>("greeter", |r, g| r.greeter.set(g))
            .build(),
    );

    assert!(matches!(factory.get_bean("left"), Err(DiError::TypeNotFound(_))));
    for name in ["left", "right"] {
        assert_eq!(factory.bean_state(name), BeanState::Unknown);
        assert!(!factory.was_early_exposed(name));
    }
    assert_eq!(factory.singleton_count(), 0);

    // Registering the missing dependency makes a retry succeed with fresh objects.
    factory.register_bean_definition(
        "english",
        BeanDefinition::builder::<English, _>(English::default)
            .provides::<dyn Greeter, _>(|g| g as Arc<dyn Greeter>)
            .build(),
    );
    let left = factory.get_bean_as::<Left>("left").unwrap();
    let right = left.right.get().unwrap();
    assert!(Arc::ptr_eq(&right.left.get().unwrap(), &left));
    assert_eq!(right.greeter.get().unwrap().greet(), "hello");
}

#[derive(Default)]
struct Owner {
    partner: Autowired<Partner>,
    greeter: Autowired<dyn Greeter>,
}

#[derive(Default)]
struct Partner {
    owner: Autowired<Owner>,
}

#[test]
fn test_late_failure_evicts_holders_of_early_reference() {
    let factory = DefaultBeanFactory::new();
    factory.register_bean_definition(
        "owner",
        BeanDefinition::builder::<Owner, _>(Owner::default)
            .autowire::<Partner, _>("partner", |o, p| o.partner.set(p))
            .autowire_trait::<dyn Greeter, _>("greeter", |o, g| o.greeter.set(g))
            .build(),
    );
    factory.register_bean_definition(
        "partner",
        BeanDefinition::builder::<Partner, _>(Partner::default)
            .autowire::<Owner, _>("owner", |p, o| p.owner.set(o))
            .build(),
    );

    // partner finishes holding owner's early reference, then owner fails.
    assert!(matches!(factory.get_bean("owner"), Err(DiError::TypeNotFound(_))));
    assert_eq!(factory.bean_state("partner"), BeanState::Unknown);
    assert_eq!(factory.bean_state("owner"), BeanState::Unknown);
    assert_eq!(factory.singleton_count(), 0);

    factory.register_bean_definition(
        "english",
        BeanDefinition::builder::<English, _>(English::default)
            .provides::<dyn Greeter, _>(|g| g as Arc<dyn Greeter>)
            .build(),
    );
    let partner = factory.get_bean_as::<Partner>("partner").unwrap();
    let owner = factory.get_bean_as::<Owner>("owner").unwrap();
    assert!(Arc::ptr_eq(&partner.owner.get().unwrap(), &owner));
    assert!(owner.greeter.is_set());
}

// ===== Field Assignment Policy =====

trait Mailer: Send + Sync {
    fn send(&self) -> bool;
}

#[derive(Default)]
struct MailService;

impl Mailer for MailService {
    fn send(&self) -> bool {
        true
    }
}

struct MailerProxy {
    inner: Arc<dyn Mailer>,
    interceptor: Interceptor,
}

impl Mailer for MailerProxy {
    fn send(&self) -> bool {
        self.interceptor.invoke("send", || self.inner.send())
    }
}

#[derive(Default)]
struct Newsletter {
    mail: Autowired<MailService>,
}

fn mail_factory(config: FactoryConfig) -> DefaultBeanFactory {
    let factory = DefaultBeanFactory::builder()
        .config(config)
        .post_processor(AutoProxyCreator::new())
        .build();
    factory.register(
        BeanDefinition::builder::<MailService, _>(MailService::default)
            .provides_intercepted::<dyn Mailer, _, _>(
                |m| m as Arc<dyn Mailer>,
                |inner, interceptor| Arc::new(MailerProxy { inner, interceptor }) as Arc<dyn Mailer>,
            )
            .build(),
    );
    // A concrete-type slot cannot hold a proxied bean.
    factory.register(
        BeanDefinition::builder::<Newsletter, _>(Newsletter::default)
            .autowire::<MailService, _>("mail", |n, m| n.mail.set(m))
            .build(),
    );
    factory
}

#[test]
fn test_field_failure_is_logged_by_default() {
    let factory = mail_factory(FactoryConfig::default());

    let newsletter = factory.get_bean_as::<Newsletter>("newsletter").unwrap();
    assert!(!newsletter.mail.is_set());
    assert!(factory.get_bean("mailService").unwrap().is_proxy());
}

#[test]
fn test_field_failure_propagates_when_strict() {
    let factory = mail_factory(FactoryConfig::strict());

    match factory.get_bean("newsletter") {
        Err(DiError::FieldAssignmentFailed { bean, slot, .. }) => {
            assert_eq!(bean, "newsletter");
            assert_eq!(slot, "mail");
        }
        other => panic!("expected FieldAssignmentFailed, got {:?}", other),
    }
    assert!(!factory.contains_singleton("newsletter"));
    // The dependency itself was created successfully and stays.
    assert!(factory.contains_singleton("mailService"));
}

#[test]
fn test_rejecting_setter() {
    let factory = DefaultBeanFactory::builder()
        .config(FactoryConfig::default().with_field_failure(FieldFailurePolicy::Propagate))
        .build();
    factory.register_bean_definition(
        "english",
        BeanDefinition::builder::<English, _>(English::default)
            .provides::<dyn Greeter, _>(|g| g as Arc<dyn Greeter>)
            .build(),
    );
    factory.register_bean_definition(
        "host",
        BeanDefinition::builder::<Host, _>(Host::default)
            .autowire_trait::<dyn Greeter, _>("greeter", |_, _| Err("read-only".to_string()))
            .build(),
    );

    match factory.get_bean("host").unwrap_err() {
        DiError::FieldAssignmentFailed { reason, .. } => assert_eq!(reason, "read-only"),
        other => panic!("unexpected error {:?}", other),
    }
}
