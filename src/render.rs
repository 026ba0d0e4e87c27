// src/render.rs
//! Контракт с внешним рендерером
//!
//! Ядро генерации не владеет объектами сцены. Каждый раз, когда в клетку добавляется
//! элемент (река, лес, поселение, дорога), ядро запрашивает у рендерера непрозрачный
//! дескриптор через `bind_element` и хранит его рядом с видом элемента. При удалении
//! элемента дескриптор возвращается через `release_element`.
//!
//! Внутреннее устройство дескриптора ядру неизвестно и им не используется.

use crate::grid::{Coord, ElementKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Непрозрачный дескриптор объекта, выданный рендерером
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle(pub u64);

/// Внешний рендерер, отвечающий за объекты сцены
pub trait ElementRenderer {
    /// Создаёт объект для элемента `kind` в клетке `at` и возвращает его дескриптор
    fn bind_element(&mut self, kind: ElementKind, at: Coord) -> ElementHandle;

    /// Освобождает объект, ранее выданный `bind_element`
    fn release_element(&mut self, handle: ElementHandle);
}

/// Рендерер по умолчанию: выдаёт последовательные номера и помнит живые дескрипторы.
///
/// Используется CLI и тестами, когда настоящей сцены нет.
#[derive(Debug, Default)]
pub struct HandleAllocator {
    next: u64,
    live: HashSet<ElementHandle>,
    released: usize,
}

impl HandleAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Количество выданных и ещё не освобождённых дескрипторов
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Сколько дескрипторов было освобождено за всё время
    #[must_use]
    pub fn released_count(&self) -> usize {
        self.released
    }

    #[must_use]
    pub fn is_live(&self, handle: ElementHandle) -> bool {
        self.live.contains(&handle)
    }
}

impl ElementRenderer for HandleAllocator {
    fn bind_element(&mut self, _kind: ElementKind, _at: Coord) -> ElementHandle {
        let handle = ElementHandle(self.next);
        self.next += 1;
        self.live.insert(handle);
        handle
    }

    fn release_element(&mut self, handle: ElementHandle) {
        if self.live.remove(&handle) {
            self.released += 1;
        }
    }
}
