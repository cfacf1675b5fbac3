//! A user service and repository that depend on each other, with the
//! service wrapped in a logging proxy.
//!
//! Run with `RUST_LOG=debug cargo run --example user_service` to watch the
//! early-reference path.

use ferrous_beans::{
    AutoProxyCreator, Autowired, Bean, BeanDefinition, BeanFactory, DefaultBeanFactory, DiResult,
    FactoryConfig, Interceptor, LoggingObserver,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

trait UserServiceApi: Send + Sync {
    fn hello(&self);
}

#[derive(Default)]
struct UserService {
    repository: Autowired<UserRepository>,
}

impl UserServiceApi for UserService {
    fn hello(&self) {
        if let Some(repository) = self.repository.get() {
            repository.select_by_id(1);
        }
        println!("hello, my first bean query");
    }
}

struct UserServiceProxy {
    inner: Arc<dyn UserServiceApi>,
    interceptor: Interceptor,
}

impl UserServiceApi for UserServiceProxy {
    fn hello(&self) {
        self.interceptor.invoke("hello", || self.inner.hello())
    }
}

#[derive(Default)]
struct UserRepository {
    service: Autowired<dyn UserServiceApi>,
}

impl UserRepository {
    fn select_by_id(&self, id: u32) {
        println!("select user {} (service wired: {})", id, self.service.is_set());
    }
}

fn main() -> DiResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let factory = DefaultBeanFactory::builder()
        .config(FactoryConfig::from_env())
        .post_processor(AutoProxyCreator::new())
        .observer(Arc::new(LoggingObserver::new()))
        .build();

    factory.register_bean_definition(
        "userService",
        BeanDefinition::builder::<UserService, _>(UserService::default)
            .provides_intercepted::<dyn UserServiceApi, _, _>(
                |s| s as Arc<dyn UserServiceApi>,
                |inner, interceptor| {
                    Arc::new(UserServiceProxy { inner, interceptor }) as Arc<dyn UserServiceApi>
                },
            )
            .autowire::<UserRepository, _>("repository", |s, r| s.repository.set(r))
            .build(),
    );
    factory.register_bean_definition(
        "userRepository",
        BeanDefinition::builder::<UserRepository, _>(UserRepository::default)
            .autowire_trait::<dyn UserServiceApi, _>("service", |r, s| r.service.set(s))
            .build(),
    );

    let first = factory.get_bean("userService")?;
    let second = factory.get_bean("userService")?;
    println!("same instance: {}", Bean::ptr_eq(&first, &second));
    println!("proxied: {}", first.is_proxy());

    let service = factory.get_bean_trait::<dyn UserServiceApi>("userService")?;
    service.hello();

    for descriptor in factory.bean_descriptors() {
        println!("{:<16} {:?}", descriptor.name, descriptor.state);
    }
    Ok(())
}
