#![no_main]

use ferrous_beans::{Autowired, BeanDefinition, BeanState, DefaultBeanFactory, FactoryConfig};
use libfuzzer_sys::fuzz_target;

// Four node types wired in a ring: each one's slot requires the next type.
#[derive(Default)]
struct N0 {
    next: Autowired<N1>,
}
#[derive(Default)]
struct N1 {
    next: Autowired<N2>,
}
#[derive(Default)]
struct N2 {
    next: Autowired<N3>,
}
#[derive(Default)]
struct N3 {
    next: Autowired<N0>,
}

fn definition(kind: u8, fail: bool) -> BeanDefinition {
    match kind % 4 {
        0 => BeanDefinition::try_builder::<N0, _>(move || {
            if fail { Err("refused".into()) } else { Ok(N0::default()) }
        })
        .autowire::<N1, _>("next", |n, next| n.next.set(next))
        .build(),
        1 => BeanDefinition::builder::<N1, _>(N1::default)
            .autowire::<N2, _>("next", |n, next| n.next.set(next))
            .build(),
        2 => BeanDefinition::builder::<N2, _>(N2::default)
            .autowire::<N3, _>("next", |n, next| n.next.set(next))
            .build(),
        _ => BeanDefinition::builder::<N3, _>(N3::default)
            .autowire::<N0, _>("next", |n, next| n.next.set(next))
            .build(),
    }
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }

    let config = if data[0] & 1 == 0 { FactoryConfig::default() } else { FactoryConfig::strict() };
    let factory = DefaultBeanFactory::builder().config(config).build();

    // Each following byte pair registers one definition: (kind, name slot).
    // Repeated kinds under new names make by-type lookups ambiguous; missing
    // kinds make them fail.
    let mut names = Vec::new();
    for pair in data[1..].chunks_exact(2).take(8) {
        let name = format!("bean{}", pair[1] % 6);
        factory.register_bean_definition(name.clone(), definition(pair[0], pair[0] & 0x80 != 0));
        names.push(name);
    }
    if names.is_empty() {
        return;
    }

    let start = &names[data[0] as usize % names.len()];
    let outcome = factory.get_bean(start);

    // Whatever happened, nothing is left half-created.
    for name in factory.bean_definition_names() {
        let state = factory.bean_state(&name);
        assert!(matches!(state, BeanState::Finished | BeanState::Unknown));
    }
    match outcome {
        Ok(bean) => {
            assert_eq!(factory.bean_state(start), BeanState::Finished);
            let again = factory.get_bean(start).unwrap();
            assert!(ferrous_beans::Bean::ptr_eq(&bean, &again));
        }
        Err(_) => assert_eq!(factory.bean_state(start), BeanState::Unknown),
    }
});
